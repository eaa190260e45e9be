// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Live cloud resources and creation prototypes exchanged with the collaborators.

use std::fmt;

use crate::constants::network::{MAX_PORT, MIN_PORT};
use crate::types::network::LoadBalancerState;
use crate::types::security_group::{Direction, Protocol, Transport};

/// Provisioning state reported for VPCs, subnets, gateways and images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Available,
    Pending,
    Failed,
    Deleting,
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceState::Available => "available",
            ResourceState::Pending => "pending",
            ResourceState::Failed => "failed",
            ResourceState::Deleting => "deleting",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpc {
    pub id: String,
    pub name: String,
    pub crn: String,
    pub state: ResourceState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    pub crn: String,
    pub zone: String,
    pub ipv4_cidr_block: Option<String>,
    pub state: ResourceState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicGateway {
    pub id: String,
    pub name: String,
    pub crn: String,
    pub zone: String,
    pub state: ResourceState,
}

/// Security groups have no provisioning state: existence implies ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    pub crn: String,
}

/// Remote of a live rule as reported by the VPC API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveRemote {
    Cidr(String),
    Ip(String),
    SecurityGroup {
        id: Option<String>,
        name: Option<String>,
        crn: Option<String>,
    },
}

/// A live security group rule, discriminated by protocol family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveRule {
    All {
        id: String,
        direction: Direction,
        remote: LiveRemote,
    },
    Icmp {
        id: String,
        direction: Direction,
        remote: LiveRemote,
        icmp_type: Option<i64>,
        icmp_code: Option<i64>,
    },
    TcpUdp {
        id: String,
        direction: Direction,
        remote: LiveRemote,
        transport: Transport,
        port_min: Option<u16>,
        port_max: Option<u16>,
    },
}

impl LiveRule {
    pub fn id(&self) -> &str {
        match self {
            LiveRule::All { id, .. } | LiveRule::Icmp { id, .. } | LiveRule::TcpUdp { id, .. } => id,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            LiveRule::All { direction, .. }
            | LiveRule::Icmp { direction, .. }
            | LiveRule::TcpUdp { direction, .. } => *direction,
        }
    }

    pub fn remote(&self) -> &LiveRemote {
        match self {
            LiveRule::All { remote, .. }
            | LiveRule::Icmp { remote, .. }
            | LiveRule::TcpUdp { remote, .. } => remote,
        }
    }

    /// Port range of a TCP/UDP rule, with an absent range read as the full range.
    pub fn port_range(&self) -> Option<(u16, u16)> {
        match self {
            LiveRule::TcpUdp {
                port_min, port_max, ..
            } => Some((port_min.unwrap_or(MIN_PORT), port_max.unwrap_or(MAX_PORT))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancer {
    pub id: String,
    pub name: String,
    pub crn: String,
    pub state: LoadBalancerState,
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub crn: String,
    pub state: ResourceState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcPrototype {
    pub name: String,
    pub resource_group_id: String,
    pub address_prefix_management: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetPrototype {
    pub name: String,
    pub vpc_id: String,
    pub zone: String,
    pub resource_group_id: String,
    pub public_gateway_id: String,
    pub ip_version: String,
    pub total_ipv4_address_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicGatewayPrototype {
    pub name: String,
    pub vpc_id: String,
    pub zone: String,
    pub resource_group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupPrototype {
    pub name: String,
    pub vpc_id: String,
    pub resource_group_id: String,
}

/// Concrete remote a new rule is created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemotePrototype {
    Cidr(String),
    Address(String),
    SecurityGroupCrn(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupRulePrototype {
    pub direction: Direction,
    pub protocol: Protocol,
    pub remote: RemotePrototype,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthMonitor {
    pub delay: u32,
    pub max_retries: u32,
    pub timeout: u32,
    pub monitor_type: String,
    pub url_path: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPrototype {
    pub name: String,
    pub algorithm: String,
    pub protocol: String,
    pub health_monitor: HealthMonitor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerPrototype {
    pub port: u16,
    pub protocol: String,
    /// Name of the pool this listener forwards to
    pub default_pool: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerPrototype {
    pub name: String,
    pub resource_group_id: String,
    pub is_public: bool,
    pub subnet_ids: Vec<String>,
    pub security_group_ids: Vec<String>,
    pub pools: Vec<PoolPrototype>,
    pub listeners: Vec<ListenerPrototype>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePrototype {
    pub name: String,
    pub resource_group_id: String,
    /// Object store location, `cos://{region}/{bucket}/{object}`
    pub file_href: String,
    pub operating_system: String,
}
