// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::constants::timing;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Delay before the next pass when resources are still provisioning
    pub requeue: Duration,
    pub error_requeue: Duration,
    /// Delay before re-checking a cluster whose resources are all ready
    pub resync: Duration,
    /// Upper bound on a single reconcile pass, cloud calls included
    pub pass_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            requeue: Duration::from_secs(timing::REQUEUE_SECS),
            error_requeue: Duration::from_secs(timing::ERROR_REQUEUE_SECS),
            resync: Duration::from_secs(timing::RESYNC_SECS),
            pass_timeout: Duration::from_secs(timing::PASS_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                Some(value) => {
                    let parsed: u64 = value
                        .trim()
                        .parse()
                        .with_context(|| format!("{} must be a number of seconds, got {:?}", key, value))?;
                    anyhow::ensure!(parsed > 0, "{} must be greater than zero", key);
                    Ok(Duration::from_secs(parsed))
                }
                None => Ok(Duration::from_secs(default)),
            }
        };

        Ok(Config {
            requeue: secs("VPC_RECONCILER_REQUEUE_SECS", timing::REQUEUE_SECS)?,
            error_requeue: secs("VPC_RECONCILER_ERROR_REQUEUE_SECS", timing::ERROR_REQUEUE_SECS)?,
            resync: secs("VPC_RECONCILER_RESYNC_SECS", timing::RESYNC_SECS)?,
            pass_timeout: secs("VPC_RECONCILER_PASS_TIMEOUT_SECS", timing::PASS_TIMEOUT_SECS)?,
        })
    }
}
