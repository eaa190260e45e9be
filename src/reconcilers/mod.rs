// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-resource reconcilers and the pipeline that runs them in dependency order.

pub mod image;
pub mod load_balancer;
pub mod pipeline;
pub mod public_gateway;
pub mod resource_group;
pub mod rule_matcher;
pub mod scope;
pub mod security_group;
pub mod subnet;
pub mod tagging;
pub mod vpc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ResourceKind;

pub use image::CustomImageReconciler;
pub use load_balancer::LoadBalancerReconciler;
pub use pipeline::Pipeline;
pub use resource_group::ResourceGroupReconciler;
pub use scope::ClusterScope;
pub use security_group::SecurityGroupReconciler;
pub use subnet::SubnetReconciler;
pub use vpc::VpcReconciler;

/// Result of a successful reconcile step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything the step manages exists and is ready
    Ready,
    /// Progress was made or something is still provisioning; run the pass again later
    Requeue,
}

impl Outcome {
    pub fn is_requeue(self) -> bool {
        self == Outcome::Requeue
    }

    /// Requeue if either side requeues
    pub fn and(self, other: Outcome) -> Outcome {
        if self.is_requeue() || other.is_requeue() {
            Outcome::Requeue
        } else {
            Outcome::Ready
        }
    }

    pub fn from_requeue(requeue: bool) -> Outcome {
        if requeue {
            Outcome::Requeue
        } else {
            Outcome::Ready
        }
    }
}

/// One step of a reconcile pass.
#[async_trait]
pub trait Reconcile: Send + Sync {
    fn kind(&self) -> ResourceKind;

    async fn reconcile(&self, scope: &mut ClusterScope<'_>) -> Result<Outcome>;
}
