// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use tracing::{debug, instrument, warn};

use super::{
    ClusterScope, CustomImageReconciler, LoadBalancerReconciler, Outcome, Reconcile,
    ResourceGroupReconciler, SecurityGroupReconciler, SubnetReconciler, VpcReconciler,
};
use crate::error::Result;

/// Runs reconcile steps in dependency order. A pass ends at the first step
/// that fails or asks to be requeued.
pub struct Pipeline {
    steps: Vec<Box<dyn Reconcile>>,
}

impl Pipeline {
    pub fn new(steps: Vec<Box<dyn Reconcile>>) -> Self {
        Self { steps }
    }

    /// Resource groups, VPC, custom image, subnets, security groups, load balancers
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ResourceGroupReconciler),
            Box::new(VpcReconciler),
            Box::new(CustomImageReconciler),
            Box::new(SubnetReconciler),
            Box::new(SecurityGroupReconciler),
            Box::new(LoadBalancerReconciler),
        ])
    }

    #[instrument(skip_all, fields(cluster = %scope.cluster_name))]
    pub async fn run(&self, scope: &mut ClusterScope<'_>) -> Result<Outcome> {
        for step in &self.steps {
            match step.reconcile(scope).await {
                Ok(Outcome::Ready) => debug!("{} ready", step.kind()),
                Ok(Outcome::Requeue) => {
                    debug!("{} not ready yet, ending pass", step.kind());
                    return Ok(Outcome::Requeue);
                }
                Err(e) => {
                    warn!("Reconciling {} failed: {}", step.kind(), e);
                    return Err(e);
                }
            }
        }
        Ok(Outcome::Ready)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}
