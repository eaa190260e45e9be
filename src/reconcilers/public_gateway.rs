// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! One public gateway per availability zone, shared by every subnet in that zone.

use tracing::{debug, info, instrument};

use super::tagging::tag_resource;
use super::ClusterScope;
use crate::cloud::model::{PublicGateway, PublicGatewayPrototype};
use crate::error::Result;
use crate::types::ResourceKind;

/// Find the zone's gateway by its generated name, creating and tagging it if absent.
#[instrument(skip(scope), fields(cluster = %scope.cluster_name))]
pub async fn find_or_create_public_gateway(
    scope: &ClusterScope<'_>,
    zone: &str,
) -> Result<PublicGateway> {
    let vpc = &scope.clouds.vpc;
    let name = scope.public_gateway_name(zone);
    let resource_group_id = scope.resource_group_id()?;

    let existing = scope
        .call(
            ResourceKind::PublicGateway,
            "get",
            &name,
            vpc.get_public_gateway_by_name(&name, &resource_group_id),
        )
        .await?;
    if let Some(gateway) = existing {
        debug!("Found public gateway {} ({})", name, gateway.id);
        return Ok(gateway);
    }

    let prototype = PublicGatewayPrototype {
        name: name.clone(),
        vpc_id: scope.vpc_id()?,
        zone: zone.to_string(),
        resource_group_id,
    };
    let gateway = scope
        .call(
            ResourceKind::PublicGateway,
            "create",
            &name,
            vpc.create_public_gateway(&prototype),
        )
        .await?;
    info!("Created public gateway {} ({}) in zone {}", name, gateway.id, zone);

    tag_resource(scope, ResourceKind::PublicGateway, &name, &gateway.crn).await?;
    Ok(gateway)
}
