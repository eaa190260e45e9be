// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Control-plane and worker subnets.
//!
//! A role without declared subnets gets one generated subnet per zone of the
//! region. Both roles may resolve to the same live subnet; each keeps its own
//! status bucket.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::public_gateway::find_or_create_public_gateway;
use super::tagging::tag_resource;
use super::{ClusterScope, Outcome, Reconcile};
use crate::cloud::model::{ResourceState, Subnet as LiveSubnet, SubnetPrototype};
use crate::constants::network::{SUBNET_IP_VERSION, SUBNET_TOTAL_IPV4_ADDRESSES};
use crate::error::{ReconcileError, Result};
use crate::status::StatusKind;
use crate::types::network::{Subnet, VpcResourceStatus};
use crate::types::ResourceKind;

pub struct SubnetReconciler;

#[async_trait]
impl Reconcile for SubnetReconciler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Subnet
    }

    #[instrument(skip_all, fields(cluster = %scope.cluster_name))]
    async fn reconcile(&self, scope: &mut ClusterScope<'_>) -> Result<Outcome> {
        let network = &scope.spec.network;
        let mut control_plane = network.control_plane_subnets.clone();
        let mut workers = network.worker_subnets.clone();

        if control_plane.is_empty() || workers.is_empty() {
            let generated = generated_subnets(scope).await?;
            if control_plane.is_empty() {
                control_plane = generated.clone();
            }
            if workers.is_empty() {
                workers = generated;
            }
        }

        let control_plane =
            reconcile_role(scope, StatusKind::ControlPlaneSubnet, &control_plane).await;
        if let Err(e) = &control_plane {
            warn!("Control plane subnets failed to reconcile: {}", e);
        }
        let workers = reconcile_role(scope, StatusKind::WorkerSubnet, &workers).await;

        Ok(control_plane?.and(workers?))
    }
}

/// One subnet per zone of the cluster region, named after the zone
async fn generated_subnets(scope: &ClusterScope<'_>) -> Result<Vec<Subnet>> {
    let region = &scope.spec.region;
    let zones = scope
        .call(
            ResourceKind::Zone,
            "list",
            region,
            scope.clouds.vpc.list_zones(region),
        )
        .await?;
    if zones.is_empty() {
        return Err(ReconcileError::not_found(
            ResourceKind::Zone,
            region.as_str(),
            "region has no availability zones",
        ));
    }

    Ok(zones
        .into_iter()
        .map(|zone| Subnet {
            id: None,
            name: Some(scope.subnet_name(&zone)),
            zone: Some(zone),
        })
        .collect())
}

async fn reconcile_role(
    scope: &mut ClusterScope<'_>,
    kind: StatusKind,
    desired: &[Subnet],
) -> Result<Outcome> {
    let mut outcome = Outcome::Ready;
    for subnet in desired {
        outcome = outcome.and(reconcile_subnet(scope, kind, subnet).await?);
    }
    Ok(outcome)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Cache entry for a desired subnet: by name, else by ID
fn cached_entry(
    scope: &ClusterScope<'_>,
    kind: StatusKind,
    desired: &Subnet,
) -> Option<VpcResourceStatus> {
    if let Some(name) = non_empty(&desired.name) {
        return scope.status.get(kind, name).cloned();
    }
    let id = non_empty(&desired.id)?;
    scope
        .status
        .entries(kind)
        .find(|(_, status)| status.id == id)
        .map(|(_, status)| status.clone())
}

/// Cache a live subnet under its declared name, or its live name when only an
/// ID was declared
fn cache_live(
    scope: &mut ClusterScope<'_>,
    kind: StatusKind,
    desired: &Subnet,
    subnet: &LiveSubnet,
) -> Outcome {
    let ready = subnet.state == ResourceState::Available;
    debug!("Subnet {} ({}) is {}", subnet.name, subnet.id, subnet.state);
    let key = non_empty(&desired.name).unwrap_or(subnet.name.as_str());
    scope.status.put(
        kind,
        key,
        VpcResourceStatus::new(subnet.id.clone(), subnet.name.clone(), ready),
    );
    Outcome::from_requeue(!ready)
}

#[instrument(skip(scope, desired), fields(cluster = %scope.cluster_name, subnet = ?desired.name))]
async fn reconcile_subnet(
    scope: &mut ClusterScope<'_>,
    kind: StatusKind,
    desired: &Subnet,
) -> Result<Outcome> {
    let clouds = scope.clouds;
    let vpc_api = &clouds.vpc;

    if let Some(cached) = cached_entry(scope, kind, desired) {
        if cached.ready {
            return Ok(Outcome::Ready);
        }
        if !cached.id.is_empty() {
            let live = scope
                .call(ResourceKind::Subnet, "get", &cached.id, vpc_api.get_subnet(&cached.id))
                .await?;
            if let Some(live) = live {
                return Ok(cache_live(scope, kind, desired, &live));
            }
        }
    }

    if let Some(id) = non_empty(&desired.id) {
        let live = scope
            .call(ResourceKind::Subnet, "get", id, vpc_api.get_subnet(id))
            .await?
            .ok_or_else(|| {
                ReconcileError::not_found(ResourceKind::Subnet, id, "no subnet with this ID")
            })?;
        return Ok(cache_live(scope, kind, desired, &live));
    }

    let name = non_empty(&desired.name).ok_or_else(|| {
        ReconcileError::precondition(ResourceKind::Subnet, "<unnamed>", "subnet needs a name or an ID")
    })?;

    let existing = scope
        .call(ResourceKind::Subnet, "get", name, vpc_api.get_subnet_by_name(name))
        .await?;
    if let Some(live) = existing {
        return Ok(cache_live(scope, kind, desired, &live));
    }

    let zone = non_empty(&desired.zone).ok_or_else(|| {
        ReconcileError::precondition(ResourceKind::Subnet, name, "a zone is required to create the subnet")
    })?;
    let vpc_id = scope.vpc_id()?;
    let gateway = find_or_create_public_gateway(scope, zone).await?;

    let prototype = SubnetPrototype {
        name: name.to_string(),
        vpc_id,
        zone: zone.to_string(),
        resource_group_id: scope.resource_group_id()?,
        public_gateway_id: gateway.id,
        ip_version: SUBNET_IP_VERSION.to_string(),
        total_ipv4_address_count: SUBNET_TOTAL_IPV4_ADDRESSES,
    };
    let subnet = scope
        .call(ResourceKind::Subnet, "create", name, vpc_api.create_subnet(&prototype))
        .await?;
    info!("Created subnet {} ({}) in zone {}", subnet.name, subnet.id, zone);
    scope.status.put(
        kind,
        name,
        VpcResourceStatus::new(subnet.id.clone(), subnet.name.clone(), false),
    );

    tag_resource(scope, ResourceKind::Subnet, name, &subnet.crn).await?;
    Ok(Outcome::Requeue)
}
