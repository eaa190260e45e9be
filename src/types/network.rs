// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Desired network resources and their cached status.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::security_group::SecurityGroup;

/// Reference to a cloud resource by ID and/or name.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Generic cloud resource reference, used for resource groups.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenericResourceReference {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A desired subnet. Either `id` or `name` must be resolvable; `zone` is only
/// needed when the subnet has to be created.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Desired network topology of the cluster.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc: Option<ResourceReference>,
    /// Name of the resource group holding the network resources, if it
    /// differs from the cluster's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_plane_subnets: Vec<Subnet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub worker_subnets: Vec<Subnet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<SecurityGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_balancers: Vec<LoadBalancerSpec>,
}

fn default_public() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_public")]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_listeners: Vec<AdditionalListenerSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backend_pools: Vec<BackendPoolSpec>,
    /// Security groups attached to the load balancer at creation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<ResourceReference>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalListenerSpec {
    pub port: u16,
}

/// Overrides for a generated backend pool, matched by pool name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackendPoolSpec {
    pub name: String,
    pub algorithm: String,
    pub protocol: String,
    pub health_delay: u32,
    pub health_retries: u32,
    pub health_timeout: u32,
    pub health_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_monitor_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_monitor_port: Option<u16>,
}

/// Source and placement of the cluster's custom machine image.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cos_instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cos_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cos_bucket_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cos_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceReference>,
}

/// Cached status of a single VPC resource.
///
/// `ready == false` means the resource exists but has not finished
/// provisioning. A missing entry means it was never created or observed.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VpcResourceStatus {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub ready: bool,
}

impl VpcResourceStatus {
    pub fn new(id: impl Into<String>, name: impl Into<String>, ready: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ready,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancerState {
    CreatePending,
    Active,
    UpdatePending,
    DeletePending,
    Maintenance,
    Failed,
}

impl fmt::Display for LoadBalancerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoadBalancerState::CreatePending => "create_pending",
            LoadBalancerState::Active => "active",
            LoadBalancerState::UpdatePending => "update_pending",
            LoadBalancerState::DeletePending => "delete_pending",
            LoadBalancerState::Maintenance => "maintenance",
            LoadBalancerState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerStatus {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub state: LoadBalancerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub controller_created: bool,
}

/// Durable cache of everything the reconciler has observed or created.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VpcResourceStatus>,
    /// Keyed by subnet name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub control_plane_subnets: BTreeMap<String, VpcResourceStatus>,
    /// Keyed by subnet name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub worker_subnets: BTreeMap<String, VpcResourceStatus>,
    /// Keyed by security group name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_groups: BTreeMap<String, VpcResourceStatus>,
    /// Keyed by load balancer ID.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub load_balancers: BTreeMap<String, LoadBalancerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<GenericResourceReference>,
}
