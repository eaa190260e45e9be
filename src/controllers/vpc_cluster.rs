// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::cloud::CloudClients;
use crate::config::Config;
use crate::constants::conditions;
use crate::error::{ReconcileError, Result};
use crate::kubernetes::{patch_status, wait_for_vpc_cluster_crd};
use crate::reconcilers::{ClusterScope, Outcome, Pipeline};
use crate::types::cluster::{Condition, VpcCluster, VpcClusterStatus};
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Drives one reconcile pass per `VpcCluster` event and persists the
/// resulting status cache.
pub struct VpcClusterController {
    client: Client,
    clouds: CloudClients,
    config: Config,
    pipeline: Pipeline,
}

impl VpcClusterController {
    pub fn new(client: Client, clouds: CloudClients, config: Config) -> Self {
        Self::with_pipeline(client, clouds, config, Pipeline::standard())
    }

    pub fn with_pipeline(client: Client, clouds: CloudClients, config: Config, pipeline: Pipeline) -> Self {
        Self {
            client,
            clouds,
            config,
            pipeline,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        wait_for_vpc_cluster_crd(&self.client).await?;

        let clusters: Api<VpcCluster> = Api::all(self.client.clone());
        let context = Arc::new(self);

        info!("Watching VpcCluster resources");
        Controller::new(clusters, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled VpcCluster: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(cluster: Arc<VpcCluster>, ctx: Arc<VpcClusterController>) -> Result<Action> {
    let name = cluster.name_any();
    debug!("Reconciling VpcCluster: {}", name);

    let deadline = Instant::now() + ctx.config.pass_timeout;
    let mut scope = ClusterScope::new(&cluster, &ctx.clouds).with_deadline(deadline);
    let result = ctx.pipeline.run(&mut scope).await;

    let mut status = scope.status.into_inner();
    record_outcome(&mut status, &result);

    // Progress made before a failure is kept
    let persisted = patch_status(&ctx.client, &cluster, &status).await;
    if let (Err(e), Err(_)) = (&persisted, &result) {
        warn!("Could not persist status of {} after a failed pass: {}", name, e);
    }

    let outcome = result?;
    persisted?;
    match outcome {
        Outcome::Ready => {
            info!("VpcCluster {} is ready", name);
            Ok(Action::requeue(ctx.config.resync))
        }
        Outcome::Requeue => Ok(Action::requeue(ctx.config.requeue)),
    }
}

fn record_outcome(status: &mut VpcClusterStatus, result: &Result<Outcome>) {
    let condition = match result {
        Ok(Outcome::Ready) => Condition::ready(true, conditions::REASON_RECONCILED, None),
        Ok(Outcome::Requeue) => Condition::ready(false, conditions::REASON_PROVISIONING, None),
        Err(e) => Condition::ready(false, conditions::REASON_FAILED, Some(e.to_string())),
    };
    status.ready = matches!(result, Ok(Outcome::Ready));
    status.set_condition(condition);
}

fn error_policy(
    cluster: Arc<VpcCluster>,
    error: &ReconcileError,
    ctx: Arc<VpcClusterController>,
) -> Action {
    error!(
        "Reconciliation of VpcCluster {} failed ({}): {}",
        cluster.name_any(),
        error.reason(),
        error
    );
    Action::requeue(ctx.config.error_requeue)
}
