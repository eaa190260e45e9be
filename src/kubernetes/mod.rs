// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery and status persistence.

pub mod crd;
pub mod status;

pub use crd::wait_for_vpc_cluster_crd;
pub use status::patch_status;
