// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The operator name used for server-side apply
pub const OPERATOR_NAME: &str = "vpc-reconciler";

/// Port the Kubernetes API server listens on unless the cluster overrides it
pub const DEFAULT_API_SERVER_PORT: u16 = 6443;

/// Suffixes of generated resource names, appended to the cluster name
pub mod names {
    pub const VPC_SUFFIX: &str = "vpc";
    pub const SUBNET_INFIX: &str = "subnet";
    pub const PUBLIC_GATEWAY_INFIX: &str = "pgateway";
    pub const POOL_INFIX: &str = "pool";
    /// Prefix of the pools generated for additional listeners
    pub const ADDITIONAL_POOL_PREFIX: &str = "additional-pool";
}

/// Settings for newly created subnets and VPCs
pub mod network {
    pub const SUBNET_IP_VERSION: &str = "ipv4";
    pub const SUBNET_TOTAL_IPV4_ADDRESSES: u32 = 256;
    pub const ADDRESS_PREFIX_MANAGEMENT: &str = "auto";
    /// Port range a rule without explicit ports applies to
    pub const MIN_PORT: u16 = 1;
    pub const MAX_PORT: u16 = 65535;
}

/// Load balancer pool and health check defaults
pub mod load_balancer {
    pub const POOL_ALGORITHM: &str = "round_robin";
    pub const POOL_PROTOCOL: &str = "tcp";
    pub const LISTENER_PROTOCOL: &str = "tcp";
    pub const HEALTH_DELAY_SECS: u32 = 60;
    pub const HEALTH_RETRIES: u32 = 5;
    pub const HEALTH_TIMEOUT_SECS: u32 = 30;
    pub const HEALTH_TYPE: &str = "https";
    pub const HEALTH_MONITOR_URL: &str = "/readyz";
}

/// Custom image import settings
pub mod image {
    pub const COS_SCHEME: &str = "cos";
}

/// Reasons recorded on the Ready condition
pub mod conditions {
    pub const READY: &str = "Ready";
    pub const REASON_RECONCILED: &str = "Reconciled";
    pub const REASON_PROVISIONING: &str = "Provisioning";
    pub const REASON_FAILED: &str = "ReconcileFailed";
}

/// Controller timing defaults, overridable through the environment
pub mod timing {
    pub const REQUEUE_SECS: u64 = 15;
    pub const ERROR_REQUEUE_SECS: u64 = 60;
    pub const RESYNC_SECS: u64 = 600;
    pub const PASS_TIMEOUT_SECS: u64 = 300;
}

/// CRD discovery backoff
pub mod crd {
    pub const POLL_INTERVAL_SECS: u64 = 5;
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
