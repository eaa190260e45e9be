// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes controllers that react to watch events.

pub mod vpc_cluster;

pub use vpc_cluster::VpcClusterController;
