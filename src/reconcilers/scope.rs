// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! State shared by the steps of a single reconcile pass.

use std::future::Future;

use kube::ResourceExt;
use tokio::time::{timeout_at, Instant};

use crate::cloud::{CloudClients, CloudResult};
use crate::constants::names;
use crate::error::{ReconcileError, Result};
use crate::status::{StatusKind, StatusStore};
use crate::types::cluster::{VpcCluster, VpcClusterSpec};
use crate::types::ResourceKind;

pub struct ClusterScope<'a> {
    pub cluster_name: String,
    pub resource_group_name: String,
    pub spec: &'a VpcClusterSpec,
    pub clouds: &'a CloudClients,
    pub status: StatusStore,
    deadline: Option<Instant>,
}

impl<'a> ClusterScope<'a> {
    pub fn new(cluster: &'a VpcCluster, clouds: &'a CloudClients) -> Self {
        Self {
            cluster_name: cluster.name_any(),
            resource_group_name: cluster.resource_group_name(),
            spec: &cluster.spec,
            clouds,
            status: StatusStore::new(cluster.status.clone().unwrap_or_default()),
            deadline: None,
        }
    }

    /// Bound every cloud call of this pass by `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Await a collaborator call, attaching the resource kind, operation and
    /// target to any failure. Calls past the deadline are aborted.
    pub async fn call<T, F>(
        &self,
        kind: ResourceKind,
        operation: &'static str,
        target: &str,
        request: F,
    ) -> Result<T>
    where
        F: Future<Output = CloudResult<T>> + Send,
    {
        let result = match self.deadline {
            Some(deadline) => {
                timeout_at(deadline, request)
                    .await
                    .map_err(|_| ReconcileError::Cancelled {
                        kind,
                        operation,
                        target: target.to_string(),
                    })?
            }
            None => request.await,
        };

        result.map_err(|source| ReconcileError::Cloud {
            kind,
            operation,
            target: target.to_string(),
            source,
        })
    }

    /// ID of the cluster resource group, resolved earlier in the pass
    pub fn resource_group_id(&self) -> Result<String> {
        self.status
            .resource_group()
            .map(|rg| rg.id.clone())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ReconcileError::precondition(
                    ResourceKind::ResourceGroup,
                    &self.resource_group_name,
                    "resource group has not been resolved",
                )
            })
    }

    /// ID of the network resource group, falling back to the cluster resource group
    pub fn network_resource_group_id(&self) -> Result<String> {
        match self.status.network_resource_group() {
            Some(rg) if !rg.id.is_empty() => Ok(rg.id.clone()),
            _ => self.resource_group_id(),
        }
    }

    pub fn vpc_name(&self) -> String {
        self.spec
            .network
            .vpc
            .as_ref()
            .and_then(|vpc| vpc.name.clone())
            .unwrap_or_else(|| format!("{}-{}", self.cluster_name, names::VPC_SUFFIX))
    }

    pub fn vpc_id(&self) -> Result<String> {
        self.status
            .get(StatusKind::Vpc, "")
            .map(|vpc| vpc.id.clone())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ReconcileError::precondition(ResourceKind::Vpc, self.vpc_name(), "VPC ID is not known yet")
            })
    }

    pub fn subnet_name(&self, zone: &str) -> String {
        format!("{}-{}-{}", self.cluster_name, names::SUBNET_INFIX, zone)
    }

    pub fn public_gateway_name(&self, zone: &str) -> String {
        format!("{}-{}-{}", self.cluster_name, names::PUBLIC_GATEWAY_INFIX, zone)
    }

    /// Cached subnet IDs of both roles, control-plane first, without duplicates
    pub fn subnet_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for kind in [StatusKind::ControlPlaneSubnet, StatusKind::WorkerSubnet] {
            for (_, subnet) in self.status.entries(kind) {
                if !subnet.id.is_empty() && !ids.contains(&subnet.id) {
                    ids.push(subnet.id.clone());
                }
            }
        }
        ids
    }

    /// Cached subnet ID for `name` in either role
    pub fn subnet_id(&self, name: &str) -> Option<String> {
        [StatusKind::ControlPlaneSubnet, StatusKind::WorkerSubnet]
            .into_iter()
            .filter_map(|kind| self.status.get(kind, name))
            .map(|subnet| subnet.id.clone())
            .find(|id| !id.is_empty())
    }

    pub fn security_group_id(&self, name: &str) -> Option<String> {
        self.status
            .get(StatusKind::SecurityGroup, name)
            .map(|sg| sg.id.clone())
            .filter(|id| !id.is_empty())
    }
}
