// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Persisting the status cache on the `VpcCluster` status subresource

use kube::{
    api::{Patch, PatchParams},
    Api, Client, Resource, ResourceExt,
};
use serde_json::json;
use tracing::{debug, instrument};

use crate::constants::OPERATOR_NAME;
use crate::error::Result;
use crate::types::cluster::{VpcCluster, VpcClusterStatus};

/// Server-side apply `status` onto the status subresource of `cluster`
#[instrument(skip(client, cluster, status), fields(cluster = %cluster.name_any()))]
pub async fn patch_status(client: &Client, cluster: &VpcCluster, status: &VpcClusterStatus) -> Result<()> {
    let namespace = cluster.namespace().unwrap_or_default();
    let clusters: Api<VpcCluster> = Api::namespaced(client.clone(), &namespace);

    let patch = json!({
        "apiVersion": VpcCluster::api_version(&()),
        "kind": VpcCluster::kind(&()),
        "status": status,
    });
    let pp = PatchParams::apply(OPERATOR_NAME).force();
    clusters
        .patch_status(&cluster.name_any(), &pp, &Patch::Apply(&patch))
        .await?;

    debug!("Persisted status of {}/{}", namespace, cluster.name_any());
    Ok(())
}
