// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Declared security groups and their firewall rules.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The CIDR block that stands for "any address".
pub const CIDR_BLOCK_ANY: &str = "0.0.0.0/0";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<SecurityGroupRule>,
}

impl SecurityGroup {
    /// Name for logs and errors: the name if present, else the ID.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed>")
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

/// A declared rule. Inbound rules carry their prototype as `source`,
/// outbound rules as `destination`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(tag = "direction", rename_all = "lowercase")]
pub enum SecurityGroupRule {
    Inbound { source: RulePrototype },
    Outbound { destination: RulePrototype },
}

impl SecurityGroupRule {
    pub fn inbound(source: RulePrototype) -> Self {
        SecurityGroupRule::Inbound { source }
    }

    pub fn outbound(destination: RulePrototype) -> Self {
        SecurityGroupRule::Outbound { destination }
    }

    pub fn direction(&self) -> Direction {
        match self {
            SecurityGroupRule::Inbound { .. } => Direction::Inbound,
            SecurityGroupRule::Outbound { .. } => Direction::Outbound,
        }
    }

    pub fn prototype(&self) -> &RulePrototype {
        match self {
            SecurityGroupRule::Inbound { source } => source,
            SecurityGroupRule::Outbound { destination } => destination,
        }
    }
}

/// Protocol, protocol parameters and remotes of a declared rule. Each remote
/// expands into its own live rule.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulePrototype {
    #[serde(flatten)]
    pub protocol: Protocol,
    #[serde(default)]
    pub remotes: Vec<Remote>,
}

impl RulePrototype {
    pub fn new(protocol: Protocol, remotes: Vec<Remote>) -> Self {
        Self { protocol, remotes }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortRange {
    pub minimum_port: u16,
    pub maximum_port: u16,
}

impl PortRange {
    pub fn single(port: u16) -> Self {
        Self {
            minimum_port: port,
            maximum_port: port,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Tcp,
    Udp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Tcp => f.write_str("tcp"),
            Transport::Udp => f.write_str("udp"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum Protocol {
    All,
    #[serde(rename_all = "camelCase")]
    Icmp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icmp_type: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icmp_code: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Tcp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port_range: Option<PortRange>,
    },
    #[serde(rename_all = "camelCase")]
    Udp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port_range: Option<PortRange>,
    },
}

impl Protocol {
    pub fn tcp(port_range: Option<PortRange>) -> Self {
        Protocol::Tcp { port_range }
    }

    pub fn udp(port_range: Option<PortRange>) -> Self {
        Protocol::Udp { port_range }
    }

    /// ICMP type and code, only when both are declared.
    pub fn icmp_filter(&self) -> Option<(i64, i64)> {
        match self {
            Protocol::Icmp {
                icmp_type: Some(icmp_type),
                icmp_code: Some(icmp_code),
            } => Some((*icmp_type, *icmp_code)),
            _ => None,
        }
    }

    /// Transport and port range for TCP/UDP rules.
    pub fn transport(&self) -> Option<(Transport, Option<PortRange>)> {
        match self {
            Protocol::Tcp { port_range } => Some((Transport::Tcp, *port_range)),
            Protocol::Udp { port_range } => Some((Transport::Udp, *port_range)),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::All => f.write_str("all"),
            Protocol::Icmp { .. } => f.write_str("icmp"),
            Protocol::Tcp { .. } => f.write_str("tcp"),
            Protocol::Udp { .. } => f.write_str("udp"),
        }
    }
}

/// Source or destination of a rule.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(tag = "remoteType", rename_all = "camelCase")]
pub enum Remote {
    Any,
    Address {
        address: String,
    },
    /// Resolved to the live CIDR block of the named subnet.
    #[serde(rename = "cidr", rename_all = "camelCase")]
    Cidr { cidr_subnet_name: String },
    /// Resolved to the live security group with this name.
    #[serde(rename = "sg", rename_all = "camelCase")]
    SecurityGroup { security_group_name: String },
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remote::Any => f.write_str("any"),
            Remote::Address { address } => write!(f, "address {}", address),
            Remote::Cidr { cidr_subnet_name } => write!(f, "cidr of subnet {}", cidr_subnet_name),
            Remote::SecurityGroup {
                security_group_name,
            } => write!(f, "security group {}", security_group_name),
        }
    }
}
