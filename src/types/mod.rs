// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource schema and the desired/observed types it is built from.

pub mod cluster;
pub mod network;
pub mod security_group;

use std::fmt;

/// Cloud resource kinds handled by the reconciler, used for logging and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ResourceGroup,
    Vpc,
    Zone,
    Subnet,
    PublicGateway,
    SecurityGroup,
    SecurityGroupRule,
    LoadBalancer,
    CustomImage,
    Tag,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::ResourceGroup => "resource group",
            ResourceKind::Vpc => "VPC",
            ResourceKind::Zone => "zone",
            ResourceKind::Subnet => "subnet",
            ResourceKind::PublicGateway => "public gateway",
            ResourceKind::SecurityGroup => "security group",
            ResourceKind::SecurityGroupRule => "security group rule",
            ResourceKind::LoadBalancer => "load balancer",
            ResourceKind::CustomImage => "custom image",
            ResourceKind::Tag => "tag",
        };
        f.write_str(name)
    }
}
