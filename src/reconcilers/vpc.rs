// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Finds or creates the cluster VPC.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::tagging::tag_resource;
use super::{ClusterScope, Outcome, Reconcile};
use crate::cloud::model::{ResourceState, VpcPrototype};
use crate::constants::network::ADDRESS_PREFIX_MANAGEMENT;
use crate::error::{ReconcileError, Result};
use crate::status::StatusKind;
use crate::types::network::VpcResourceStatus;
use crate::types::ResourceKind;

pub struct VpcReconciler;

#[async_trait]
impl Reconcile for VpcReconciler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Vpc
    }

    #[instrument(skip_all, fields(cluster = %scope.cluster_name))]
    async fn reconcile(&self, scope: &mut ClusterScope<'_>) -> Result<Outcome> {
        let clouds = scope.clouds;
        let vpc_api = &clouds.vpc;
        let name = scope.vpc_name();

        let cached_id = scope
            .status
            .get(StatusKind::Vpc, "")
            .map(|vpc| vpc.id.clone())
            .filter(|id| !id.is_empty());
        let spec_id = scope
            .spec
            .network
            .vpc
            .as_ref()
            .and_then(|vpc| vpc.id.clone())
            .filter(|id| !id.is_empty());

        // A cached ID that no longer resolves falls back to the name lookup,
        // a spec-supplied one does not.
        for (id, from_spec) in [(cached_id, false), (spec_id, true)] {
            let Some(id) = id else { continue };
            let vpc = scope
                .call(ResourceKind::Vpc, "get", &id, vpc_api.get_vpc(&id))
                .await?;
            match vpc {
                Some(vpc) => {
                    let ready = vpc.state == ResourceState::Available;
                    debug!("VPC {} ({}) is {}", vpc.name, vpc.id, vpc.state);
                    scope
                        .status
                        .put(StatusKind::Vpc, "", VpcResourceStatus::new(vpc.id, vpc.name, ready));
                    return Ok(Outcome::from_requeue(!ready));
                }
                None if from_spec => {
                    return Err(ReconcileError::not_found(ResourceKind::Vpc, id, "no VPC with this ID"));
                }
                None => debug!("Cached VPC {} no longer exists", id),
            }
        }

        let existing = scope
            .call(ResourceKind::Vpc, "get", &name, vpc_api.get_vpc_by_name(&name))
            .await?;
        if let Some(vpc) = existing {
            info!("Found existing VPC {} ({})", vpc.name, vpc.id);
            scope
                .status
                .put(StatusKind::Vpc, "", VpcResourceStatus::new(vpc.id, vpc.name, false));
            return Ok(Outcome::Requeue);
        }

        let prototype = VpcPrototype {
            name: name.clone(),
            resource_group_id: scope.resource_group_id()?,
            address_prefix_management: ADDRESS_PREFIX_MANAGEMENT.to_string(),
        };
        let vpc = scope
            .call(ResourceKind::Vpc, "create", &name, vpc_api.create_vpc(&prototype))
            .await?;
        info!("Created VPC {} ({})", vpc.name, vpc.id);
        scope.status.put(
            StatusKind::Vpc,
            "",
            VpcResourceStatus::new(vpc.id.clone(), vpc.name.clone(), false),
        );

        tag_resource(scope, ResourceKind::Vpc, &name, &vpc.crn).await?;
        Ok(Outcome::Requeue)
    }
}
