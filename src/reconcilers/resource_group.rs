// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource group resolution. Resource groups are a precondition and are never created.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::{ClusterScope, Outcome, Reconcile};
use crate::error::{ReconcileError, Result};
use crate::types::network::GenericResourceReference;
use crate::types::ResourceKind;

/// Look up the resource group called `name`, requiring exactly one match
#[instrument(skip(scope), fields(cluster = %scope.cluster_name))]
pub async fn resolve_resource_group(
    scope: &ClusterScope<'_>,
    name: &str,
) -> Result<GenericResourceReference> {
    let clouds = scope.clouds;
    let mut groups = scope
        .call(
            ResourceKind::ResourceGroup,
            "list",
            name,
            clouds.resource_manager.list_resource_groups_by_name(name),
        )
        .await?;

    if groups.len() != 1 {
        return Err(ReconcileError::not_found(
            ResourceKind::ResourceGroup,
            name,
            format!("expected exactly one match, found {}", groups.len()),
        ));
    }

    let group = groups.remove(0);
    debug!("Resolved resource group {} to {}", name, group.id);
    Ok(GenericResourceReference {
        id: group.id,
        name: Some(group.name),
    })
}

/// Resolves the cluster and network resource groups into the status cache.
pub struct ResourceGroupReconciler;

#[async_trait]
impl Reconcile for ResourceGroupReconciler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ResourceGroup
    }

    async fn reconcile(&self, scope: &mut ClusterScope<'_>) -> Result<Outcome> {
        let cached = scope
            .status
            .resource_group()
            .is_some_and(|rg| !rg.id.is_empty());
        if !cached {
            let name = scope.resource_group_name.clone();
            let reference = resolve_resource_group(scope, &name).await?;
            info!("Using resource group {} ({}) for cluster {}", name, reference.id, scope.cluster_name);
            scope.status.put_resource_group(reference);
        }

        let network_group = scope.spec.network.resource_group.clone();
        if let Some(name) = network_group.filter(|n| !n.is_empty()) {
            let cached = scope
                .status
                .network_resource_group()
                .is_some_and(|rg| !rg.id.is_empty() && rg.name.as_deref() == Some(name.as_str()));
            if !cached {
                let reference = if name == scope.resource_group_name {
                    match scope.status.resource_group() {
                        Some(rg) => rg.clone(),
                        None => resolve_resource_group(scope, &name).await?,
                    }
                } else {
                    resolve_resource_group(scope, &name).await?
                };
                info!("Using network resource group {} ({})", name, reference.id);
                scope.status.put_network_resource_group(reference);
            }
        }

        Ok(Outcome::Ready)
    }
}
