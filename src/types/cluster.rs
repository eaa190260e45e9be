// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

use super::network::{
    GenericResourceReference, ImageSpec, NetworkSpec, NetworkStatus, VpcResourceStatus,
};
use crate::constants::{conditions, DEFAULT_API_SERVER_PORT};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "infrastructure.cluster.x-k8s.io", version = "v1beta2", kind = "VpcCluster")]
#[kube(namespaced)]
#[kube(status = "VpcClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct VpcClusterSpec {
    pub region: String,
    /// Name of the resource group the cluster's resources are created in.
    /// Defaults to the object name when empty.
    #[serde(default)]
    pub resource_group: String,
    #[serde(default)]
    pub network: NetworkSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_server_port: Option<u16>,
}

impl VpcClusterSpec {
    pub fn api_server_port(&self) -> u16 {
        self.api_server_port.unwrap_or(DEFAULT_API_SERVER_PORT)
    }
}

impl VpcCluster {
    /// Name of the cluster resource group, falling back to the object name.
    pub fn resource_group_name(&self) -> String {
        if self.spec.resource_group.is_empty() {
            self.name_any()
        } else {
            self.spec.resource_group.clone()
        }
    }

    /// Check if the last reconcile pass converged all declared resources
    pub fn is_ready(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.ready)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VpcClusterStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<GenericResourceReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_status: Option<NetworkStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_status: Option<VpcResourceStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl VpcClusterStatus {
    /// Insert or replace the condition with the same type
    pub fn set_condition(&mut self, condition: Condition) {
        self.conditions
            .retain(|c| c.condition_type != condition.condition_type);
        self.conditions.push(condition);
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn ready(status: bool, reason: &str, message: Option<String>) -> Self {
        Self {
            condition_type: conditions::READY.to_string(),
            status: if status { "True" } else { "False" }.to_string(),
            reason: Some(reason.to_string()),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::security_group::{Protocol, Remote};
    use kube::api::ObjectMeta;

    const CLUSTER_YAML: &str = r#"
apiVersion: infrastructure.cluster.x-k8s.io/v1beta2
kind: VpcCluster
metadata:
  name: c1
  namespace: default
spec:
  region: us-south
  resourceGroup: c1-rg
  network:
    resourceGroup: c1-network-rg
    vpc:
      name: c1-vpc
    securityGroups:
      - name: c1-sg-cp
        rules:
          - direction: inbound
            source:
              protocol: tcp
              portRange:
                minimumPort: 6443
                maximumPort: 6443
              remotes:
                - remoteType: any
    loadBalancers:
      - name: c1-api
        public: false
        additionalListeners:
          - port: 22623
  image:
    name: c1-rhcos
    cosInstance: c1-cos
    cosBucket: images
    cosObject: rhcos.qcow2
    operatingSystem: rhel-coreos-stable-amd64
"#;

    fn make_cluster(name: &str, resource_group: &str, status: Option<VpcClusterStatus>) -> VpcCluster {
        VpcCluster {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: VpcClusterSpec {
                region: "us-south".to_string(),
                resource_group: resource_group.to_string(),
                network: NetworkSpec::default(),
                image: None,
                api_server_port: None,
            },
            status,
        }
    }

    #[test]
    fn test_manifest_parses() {
        let cluster: VpcCluster = serde_yaml::from_str(CLUSTER_YAML).unwrap();
        assert_eq!(cluster.spec.region, "us-south");
        assert_eq!(cluster.spec.network.resource_group.as_deref(), Some("c1-network-rg"));

        let sg = &cluster.spec.network.security_groups[0];
        assert_eq!(sg.name.as_deref(), Some("c1-sg-cp"));
        let rule = sg.rules[0].prototype();
        assert!(matches!(rule.protocol, Protocol::Tcp { .. }));
        assert_eq!(rule.remotes, vec![Remote::Any]);

        let lb = &cluster.spec.network.load_balancers[0];
        assert!(!lb.public);
        assert_eq!(lb.additional_listeners[0].port, 22623);

        let image = cluster.spec.image.as_ref().unwrap();
        assert_eq!(image.cos_bucket_region, None);
        assert_eq!(cluster.spec.api_server_port(), 6443);
    }

    #[test]
    fn test_resource_group_name_from_spec() {
        let cluster = make_cluster("c1", "shared-rg", None);
        assert_eq!(cluster.resource_group_name(), "shared-rg");
    }

    #[test]
    fn test_resource_group_name_falls_back_to_object_name() {
        let cluster = make_cluster("c1", "", None);
        assert_eq!(cluster.resource_group_name(), "c1");
    }

    #[test]
    fn test_is_ready() {
        assert!(!make_cluster("c1", "", None).is_ready());
        let ready = VpcClusterStatus {
            ready: true,
            ..Default::default()
        };
        assert!(make_cluster("c1", "", Some(ready)).is_ready());
    }

    #[test]
    fn test_set_condition_replaces_same_type() {
        let mut status = VpcClusterStatus::default();
        status.set_condition(Condition::ready(false, "Provisioning", None));
        status.set_condition(Condition::ready(true, "Reconciled", None));

        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].status, "True");
        assert_eq!(status.conditions[0].reason.as_deref(), Some("Reconciled"));
    }
}
