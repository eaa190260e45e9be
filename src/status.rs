// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Status store: keyed access to the cached resource status persisted on the
//! `VpcCluster` status sub-document.

use std::collections::BTreeMap;

use crate::types::cluster::VpcClusterStatus;
use crate::types::network::{
    GenericResourceReference, LoadBalancerStatus, NetworkStatus, VpcResourceStatus,
};

/// Kinds of cached resources addressed by name. `Vpc` and `CustomImage` are
/// singletons and ignore the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Vpc,
    CustomImage,
    ControlPlaneSubnet,
    WorkerSubnet,
    SecurityGroup,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusStore {
    status: VpcClusterStatus,
}

impl StatusStore {
    pub fn new(status: VpcClusterStatus) -> Self {
        Self { status }
    }

    pub fn into_inner(self) -> VpcClusterStatus {
        self.status
    }

    pub fn status(&self) -> &VpcClusterStatus {
        &self.status
    }

    pub fn get(&self, kind: StatusKind, name: &str) -> Option<&VpcResourceStatus> {
        match kind {
            StatusKind::CustomImage => self.status.image_status.as_ref(),
            StatusKind::Vpc => self.network()?.vpc.as_ref(),
            _ => self.network()?.named(kind)?.get(name),
        }
    }

    /// Insert or replace the cached status. Entries are never removed.
    pub fn put(&mut self, kind: StatusKind, name: &str, status: VpcResourceStatus) {
        match kind {
            StatusKind::CustomImage => self.status.image_status = Some(status),
            StatusKind::Vpc => self.network_mut().vpc = Some(status),
            _ => {
                if let Some(map) = self.network_mut().named_mut(kind) {
                    map.insert(name.to_string(), status);
                }
            }
        }
    }

    /// All cached entries of a named kind, keyed by resource name.
    pub fn entries(&self, kind: StatusKind) -> impl Iterator<Item = (&String, &VpcResourceStatus)> {
        self.network()
            .and_then(|n| n.named(kind))
            .into_iter()
            .flat_map(|m| m.iter())
    }

    pub fn load_balancer(&self, id: &str) -> Option<&LoadBalancerStatus> {
        self.network()?.load_balancers.get(id)
    }

    pub fn load_balancers(&self) -> impl Iterator<Item = &LoadBalancerStatus> {
        self.network()
            .into_iter()
            .flat_map(|n| n.load_balancers.values())
    }

    pub fn put_load_balancer(&mut self, status: LoadBalancerStatus) {
        self.network_mut()
            .load_balancers
            .insert(status.id.clone(), status);
    }

    pub fn resource_group(&self) -> Option<&GenericResourceReference> {
        self.status.resource_group.as_ref()
    }

    pub fn put_resource_group(&mut self, reference: GenericResourceReference) {
        self.status.resource_group = Some(reference);
    }

    pub fn network_resource_group(&self) -> Option<&GenericResourceReference> {
        self.network()?.resource_group.as_ref()
    }

    pub fn put_network_resource_group(&mut self, reference: GenericResourceReference) {
        self.network_mut().resource_group = Some(reference);
    }

    fn network(&self) -> Option<&NetworkStatus> {
        self.status.network_status.as_ref()
    }

    fn network_mut(&mut self) -> &mut NetworkStatus {
        self.status.network_status.get_or_insert_with(NetworkStatus::default)
    }
}

impl NetworkStatus {
    fn named(&self, kind: StatusKind) -> Option<&BTreeMap<String, VpcResourceStatus>> {
        match kind {
            StatusKind::ControlPlaneSubnet => Some(&self.control_plane_subnets),
            StatusKind::WorkerSubnet => Some(&self.worker_subnets),
            StatusKind::SecurityGroup => Some(&self.security_groups),
            StatusKind::Vpc | StatusKind::CustomImage => None,
        }
    }

    fn named_mut(&mut self, kind: StatusKind) -> Option<&mut BTreeMap<String, VpcResourceStatus>> {
        match kind {
            StatusKind::ControlPlaneSubnet => Some(&mut self.control_plane_subnets),
            StatusKind::WorkerSubnet => Some(&mut self.worker_subnets),
            StatusKind::SecurityGroup => Some(&mut self.security_groups),
            StatusKind::Vpc | StatusKind::CustomImage => None,
        }
    }
}
