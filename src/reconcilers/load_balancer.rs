// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Load balancers in front of the API server. At most one load balancer is
//! created per pass.

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::tagging::tag_resource;
use super::{ClusterScope, Outcome, Reconcile};
use crate::cloud::model::{
    HealthMonitor, ListenerPrototype, LoadBalancer, LoadBalancerPrototype, PoolPrototype,
};
use crate::constants::{load_balancer as defaults, names};
use crate::error::{ReconcileError, Result};
use crate::types::network::{LoadBalancerSpec, LoadBalancerState, LoadBalancerStatus};
use crate::types::ResourceKind;

pub struct LoadBalancerReconciler;

#[async_trait]
impl Reconcile for LoadBalancerReconciler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::LoadBalancer
    }

    #[instrument(skip_all, fields(cluster = %scope.cluster_name))]
    async fn reconcile(&self, scope: &mut ClusterScope<'_>) -> Result<Outcome> {
        let spec = scope.spec;
        let mut outcome = Outcome::Ready;
        let mut created = false;

        for lb in &spec.network.load_balancers {
            match find_load_balancer(scope, lb).await? {
                Some(live) => {
                    outcome = outcome.and(record(scope, &live, false));
                    if live.state == LoadBalancerState::Failed {
                        return Err(ReconcileError::precondition(
                            ResourceKind::LoadBalancer,
                            format!("{} ({})", live.name, live.id),
                            "load balancer is in failed state",
                        ));
                    }
                }
                None if created => {
                    debug!("Deferring creation of load balancer {} to the next pass", lb.name);
                    outcome = Outcome::Requeue;
                }
                None => {
                    create_load_balancer(scope, lb).await?;
                    created = true;
                    outcome = Outcome::Requeue;
                }
            }
        }

        Ok(outcome)
    }
}

/// Cache the live state. Anything but `Active` needs another pass; a `Failed`
/// load balancer is turned into an error by the caller.
fn record(scope: &mut ClusterScope<'_>, live: &LoadBalancer, controller_created: bool) -> Outcome {
    let controller_created = controller_created
        || scope
            .status
            .load_balancer(&live.id)
            .is_some_and(|s| s.controller_created);
    match live.state {
        LoadBalancerState::Active => debug!("Load balancer {} is active", live.name),
        LoadBalancerState::Failed => warn!("Load balancer {} ({}) is in failed state", live.name, live.id),
        state => info!("Load balancer {} is {}", live.name, state),
    }
    scope.status.put_load_balancer(LoadBalancerStatus {
        id: live.id.clone(),
        name: live.name.clone(),
        state: live.state,
        hostname: live.hostname.clone(),
        controller_created,
    });
    Outcome::from_requeue(live.state != LoadBalancerState::Active)
}

/// Resolve by spec ID, cached ID or name. A cached `Active` load balancer is
/// returned from the cache without a cloud call.
async fn find_load_balancer(
    scope: &ClusterScope<'_>,
    lb: &LoadBalancerSpec,
) -> Result<Option<LoadBalancer>> {
    let vpc_api = &scope.clouds.vpc;
    let spec_id = lb.id.as_deref().filter(|id| !id.is_empty());
    let cached = match spec_id {
        Some(id) => scope.status.load_balancer(id),
        None => scope.status.load_balancers().find(|s| s.name == lb.name),
    };

    if let Some(status) = cached.filter(|s| s.state == LoadBalancerState::Active) {
        return Ok(Some(LoadBalancer {
            id: status.id.clone(),
            name: status.name.clone(),
            crn: String::new(),
            state: status.state,
            hostname: status.hostname.clone(),
        }));
    }

    if let Some(id) = spec_id.or(cached.map(|s| s.id.as_str())) {
        let live = scope
            .call(ResourceKind::LoadBalancer, "get", id, vpc_api.get_load_balancer(id))
            .await?;
        match live {
            Some(live) => return Ok(Some(live)),
            None if spec_id.is_some() => {
                return Err(ReconcileError::not_found(
                    ResourceKind::LoadBalancer,
                    id,
                    "no load balancer with this ID",
                ))
            }
            None => {}
        }
    }

    if lb.name.is_empty() {
        return Err(ReconcileError::precondition(
            ResourceKind::LoadBalancer,
            "<unnamed>",
            "load balancer needs a name or an ID",
        ));
    }
    scope
        .call(
            ResourceKind::LoadBalancer,
            "get",
            &lb.name,
            vpc_api.get_load_balancer_by_name(&lb.name),
        )
        .await
}

#[instrument(skip_all, fields(load_balancer = %lb.name))]
async fn create_load_balancer(scope: &mut ClusterScope<'_>, lb: &LoadBalancerSpec) -> Result<()> {
    let clouds = scope.clouds;

    let subnet_ids = scope.subnet_ids();
    if subnet_ids.is_empty() {
        return Err(ReconcileError::precondition(
            ResourceKind::LoadBalancer,
            &lb.name,
            "no subnets are available to place the load balancer in",
        ));
    }

    let (pools, listeners) = pools_and_listeners(lb, scope.spec.api_server_port());
    let prototype = LoadBalancerPrototype {
        name: lb.name.clone(),
        resource_group_id: scope.resource_group_id()?,
        is_public: lb.public,
        subnet_ids,
        security_group_ids: security_group_ids(scope, lb).await?,
        pools,
        listeners,
    };

    let live = scope
        .call(
            ResourceKind::LoadBalancer,
            "create",
            &lb.name,
            clouds.vpc.create_load_balancer(&prototype),
        )
        .await?;
    info!("Created load balancer {} ({})", live.name, live.id);
    record(scope, &live, true);

    tag_resource(scope, ResourceKind::LoadBalancer, &lb.name, &live.crn).await
}

async fn security_group_ids(scope: &ClusterScope<'_>, lb: &LoadBalancerSpec) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(lb.security_groups.len());
    for reference in &lb.security_groups {
        if let Some(id) = reference.id.as_deref().filter(|id| !id.is_empty()) {
            ids.push(id.to_string());
            continue;
        }
        let name = reference.name.as_deref().unwrap_or_default();
        if let Some(id) = scope.security_group_id(name) {
            ids.push(id);
            continue;
        }
        let group = scope
            .call(
                ResourceKind::SecurityGroup,
                "get",
                name,
                scope.clouds.vpc.get_security_group_by_name(name),
            )
            .await?
            .ok_or_else(|| {
                ReconcileError::not_found(
                    ResourceKind::SecurityGroup,
                    name,
                    format!("attached to load balancer {}", lb.name),
                )
            })?;
        ids.push(group.id);
    }
    Ok(ids)
}

/// One pool and TCP listener for the API port and one per additional port.
/// A declared backend pool with the same name overrides the defaults.
fn pools_and_listeners(lb: &LoadBalancerSpec, api_port: u16) -> (Vec<PoolPrototype>, Vec<ListenerPrototype>) {
    let mut ports = vec![(api_port, format!("{}-{}-{}", lb.name, names::POOL_INFIX, api_port))];
    for listener in &lb.additional_listeners {
        if ports.iter().all(|(port, _)| *port != listener.port) {
            ports.push((
                listener.port,
                format!("{}-{}", names::ADDITIONAL_POOL_PREFIX, listener.port),
            ));
        }
    }

    ports
        .into_iter()
        .map(|(port, name)| {
            let pool = match lb.backend_pools.iter().find(|p| p.name == name) {
                Some(declared) => PoolPrototype {
                    name: name.clone(),
                    algorithm: declared.algorithm.clone(),
                    protocol: declared.protocol.clone(),
                    health_monitor: HealthMonitor {
                        delay: declared.health_delay,
                        max_retries: declared.health_retries,
                        timeout: declared.health_timeout,
                        monitor_type: declared.health_type.clone(),
                        url_path: declared.health_monitor_url.clone(),
                        port: declared.health_monitor_port,
                    },
                },
                None => PoolPrototype {
                    name: name.clone(),
                    algorithm: defaults::POOL_ALGORITHM.to_string(),
                    protocol: defaults::POOL_PROTOCOL.to_string(),
                    health_monitor: HealthMonitor {
                        delay: defaults::HEALTH_DELAY_SECS,
                        max_retries: defaults::HEALTH_RETRIES,
                        timeout: defaults::HEALTH_TIMEOUT_SECS,
                        monitor_type: defaults::HEALTH_TYPE.to_string(),
                        url_path: Some(defaults::HEALTH_MONITOR_URL.to_string()),
                        port: None,
                    },
                },
            };
            let listener = ListenerPrototype {
                port,
                protocol: defaults::LISTENER_PROTOCOL.to_string(),
                default_pool: name,
            };
            (pool, listener)
        })
        .unzip()
}
