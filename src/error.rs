// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

use crate::types::ResourceKind;

/// Error reported by a cloud collaborator call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudError {
    #[error("cloud API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("{kind} {name} not found: {reason}")]
    NotFound {
        kind: ResourceKind,
        name: String,
        reason: String,
    },

    #[error("cannot reconcile {kind} {name}: {reason}")]
    Precondition {
        kind: ResourceKind,
        name: String,
        reason: String,
    },

    #[error("failed to {operation} {kind} {target}: {source}")]
    Cloud {
        kind: ResourceKind,
        operation: &'static str,
        target: String,
        #[source]
        source: CloudError,
    },

    #[error("{kind} {name} was created but could not be tagged: {source}")]
    Tagging {
        kind: ResourceKind,
        name: String,
        #[source]
        source: Box<ReconcileError>,
    },

    #[error("deadline exceeded while trying to {operation} {kind} {target}")]
    Cancelled {
        kind: ResourceKind,
        operation: &'static str,
        target: String,
    },

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),
}

impl ReconcileError {
    pub fn not_found(kind: ResourceKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        ReconcileError::NotFound {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn precondition(
        kind: ResourceKind,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ReconcileError::Precondition {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly reason, used on the Ready condition.
    pub fn reason(&self) -> &'static str {
        match self {
            ReconcileError::NotFound { .. } => "NotFound",
            ReconcileError::Precondition { .. } => "PreconditionFailed",
            ReconcileError::Cloud { .. } => "CloudApiError",
            ReconcileError::Tagging { .. } => "TaggingFailed",
            ReconcileError::Cancelled { .. } => "Cancelled",
            ReconcileError::KubeError(_) => "KubernetesError",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
