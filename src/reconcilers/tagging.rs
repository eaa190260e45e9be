// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tags every resource created for a cluster with the cluster name.

use tracing::{debug, instrument};

use super::ClusterScope;
use crate::error::{ReconcileError, Result};
use crate::types::ResourceKind;

/// Attach the cluster tag to `crn`, creating the tag first if it does not exist.
/// Any failure is reported as a tagging error on the created resource.
#[instrument(skip(scope, crn), fields(cluster = %scope.cluster_name))]
pub async fn tag_resource(
    scope: &ClusterScope<'_>,
    kind: ResourceKind,
    name: &str,
    crn: &str,
) -> Result<()> {
    ensure_tag_attached(scope, &scope.cluster_name, crn)
        .await
        .map_err(|source| ReconcileError::Tagging {
            kind,
            name: name.to_string(),
            source: Box::new(source),
        })
}

async fn ensure_tag_attached(scope: &ClusterScope<'_>, tag: &str, crn: &str) -> Result<()> {
    let tagging = &scope.clouds.tagging;

    let tags = scope
        .call(ResourceKind::Tag, "list", tag, tagging.list_user_tags())
        .await?;
    if !tags.iter().any(|t| t.name == tag) {
        debug!("Creating tag {}", tag);
        scope
            .call(ResourceKind::Tag, "create", tag, tagging.create_tag(tag))
            .await?;
    }

    scope
        .call(ResourceKind::Tag, "attach", tag, tagging.attach_tag(tag, crn))
        .await?;
    debug!("Attached tag {} to {}", tag, crn);
    Ok(())
}
