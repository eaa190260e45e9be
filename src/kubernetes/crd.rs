// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting for the `VpcCluster` CRD to be served

use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::types::cluster::VpcCluster;

/// Block until the API server serves `VpcCluster`, backing off exponentially
/// from `POLL_INTERVAL_SECS` up to `POLL_MAX_INTERVAL_SECS`.
pub async fn wait_for_vpc_cluster_crd(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;
    let api_version = VpcCluster::api_version(&());

    loop {
        match vpc_cluster_crd_served(client).await {
            Ok(true) => {
                info!("VpcCluster CRD ({}) is available", api_version);
                return Ok(());
            }
            Ok(false) => info!(
                "VpcCluster CRD ({}) not served yet, waiting {} seconds...",
                api_version, interval
            ),
            Err(e) => warn!(
                "Error discovering VpcCluster CRD: {}, retrying in {} seconds...",
                e, interval
            ),
        }

        sleep(Duration::from_secs(interval)).await;
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

async fn vpc_cluster_crd_served(client: &Client) -> Result<bool> {
    let group = VpcCluster::group(&());
    let discovery = Discovery::new(client.clone())
        .filter(&[&*group])
        .run()
        .await?;

    let version = VpcCluster::version(&());
    let kind = VpcCluster::kind(&());
    let served = discovery
        .groups()
        .filter(|g| g.name() == group)
        .flat_map(|g| g.recommended_resources())
        .any(|(ar, _)| ar.kind == kind && ar.version == version);
    Ok(served)
}
