// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decides whether a live security group rule already satisfies one remote of
//! a declared rule, and resolves declared remotes into creatable ones.

use std::collections::HashMap;

use tracing::debug;

use super::ClusterScope;
use crate::cloud::model::{LiveRemote, LiveRule, RemotePrototype, SecurityGroup};
use crate::constants::network::{MAX_PORT, MIN_PORT};
use crate::error::{ReconcileError, Result};
use crate::types::security_group::{Direction, Protocol, Remote, CIDR_BLOCK_ANY};
use crate::types::ResourceKind;

/// Matches declared remotes against live rules. Subnet CIDRs and referenced
/// security groups are looked up once and remembered for the rest of the pass.
#[derive(Default)]
pub struct RuleMatcher {
    subnet_cidrs: HashMap<String, String>,
    security_groups: HashMap<String, SecurityGroup>,
}

impl RuleMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `live` has the same direction, protocol, protocol parameters
    /// and an equivalent remote as the declared rule for `remote`.
    pub async fn matches(
        &mut self,
        scope: &ClusterScope<'_>,
        direction: Direction,
        protocol: &Protocol,
        remote: &Remote,
        live: &LiveRule,
    ) -> Result<bool> {
        if live.direction() != direction || !protocol_matches(protocol, live) {
            return Ok(false);
        }
        self.remote_matches(scope, remote, live.remote()).await
    }

    async fn remote_matches(
        &mut self,
        scope: &ClusterScope<'_>,
        remote: &Remote,
        live: &LiveRemote,
    ) -> Result<bool> {
        let matched = match (remote, live) {
            (Remote::Any, LiveRemote::Cidr(block) | LiveRemote::Ip(block)) => block == CIDR_BLOCK_ANY,
            (Remote::Address { address }, LiveRemote::Ip(ip)) => address == ip,
            (Remote::Cidr { cidr_subnet_name }, LiveRemote::Cidr(block)) => {
                &self.subnet_cidr(scope, cidr_subnet_name).await? == block
            }
            (
                Remote::SecurityGroup {
                    security_group_name,
                },
                LiveRemote::SecurityGroup { id, name, crn },
            ) => {
                // Name, then cached ID, then CRN; each only short-circuits on a match
                if name.as_deref() == Some(security_group_name.as_str()) {
                    true
                } else if id.is_some() && *id == scope.security_group_id(security_group_name) {
                    true
                } else if let Some(crn) = crn {
                    let group = self.security_group(scope, security_group_name).await?;
                    crn == &group.crn
                } else {
                    false
                }
            }
            _ => false,
        };
        Ok(matched)
    }

    /// The concrete remote a new rule is created with
    pub async fn remote_prototype(
        &mut self,
        scope: &ClusterScope<'_>,
        remote: &Remote,
    ) -> Result<RemotePrototype> {
        Ok(match remote {
            Remote::Any => RemotePrototype::Cidr(CIDR_BLOCK_ANY.to_string()),
            Remote::Address { address } => RemotePrototype::Address(address.clone()),
            Remote::Cidr { cidr_subnet_name } => {
                RemotePrototype::Cidr(self.subnet_cidr(scope, cidr_subnet_name).await?)
            }
            Remote::SecurityGroup {
                security_group_name,
            } => RemotePrototype::SecurityGroupCrn(
                self.security_group(scope, security_group_name).await?.crn,
            ),
        })
    }

    async fn subnet_cidr(&mut self, scope: &ClusterScope<'_>, name: &str) -> Result<String> {
        if let Some(cidr) = self.subnet_cidrs.get(name) {
            return Ok(cidr.clone());
        }

        let vpc_api = &scope.clouds.vpc;
        let subnet = match scope.subnet_id(name) {
            Some(id) => {
                scope
                    .call(ResourceKind::Subnet, "get", &id, vpc_api.get_subnet(&id))
                    .await?
            }
            None => {
                scope
                    .call(ResourceKind::Subnet, "get", name, vpc_api.get_subnet_by_name(name))
                    .await?
            }
        };
        let cidr = subnet
            .and_then(|s| s.ipv4_cidr_block)
            .ok_or_else(|| {
                ReconcileError::not_found(
                    ResourceKind::Subnet,
                    name,
                    "cannot resolve the CIDR block of a rule remote",
                )
            })?;

        debug!("Resolved CIDR of subnet {} to {}", name, cidr);
        self.subnet_cidrs.insert(name.to_string(), cidr.clone());
        Ok(cidr)
    }

    async fn security_group(
        &mut self,
        scope: &ClusterScope<'_>,
        name: &str,
    ) -> Result<SecurityGroup> {
        if let Some(group) = self.security_groups.get(name) {
            return Ok(group.clone());
        }

        let vpc_api = &scope.clouds.vpc;
        let group = match scope.security_group_id(name) {
            Some(id) => {
                scope
                    .call(ResourceKind::SecurityGroup, "get", &id, vpc_api.get_security_group(&id))
                    .await?
            }
            None => {
                scope
                    .call(
                        ResourceKind::SecurityGroup,
                        "get",
                        name,
                        vpc_api.get_security_group_by_name(name),
                    )
                    .await?
            }
        }
        .ok_or_else(|| {
            ReconcileError::not_found(
                ResourceKind::SecurityGroup,
                name,
                "referenced by a rule remote but does not exist",
            )
        })?;

        self.security_groups.insert(name.to_string(), group.clone());
        Ok(group)
    }
}

/// Same protocol family and matching protocol parameters. ICMP type and code
/// are only compared when both are declared; an undeclared port range stands
/// for all ports.
fn protocol_matches(protocol: &Protocol, live: &LiveRule) -> bool {
    match (protocol, live) {
        (Protocol::All, LiveRule::All { .. }) => true,
        (
            Protocol::Icmp { .. },
            LiveRule::Icmp {
                icmp_type,
                icmp_code,
                ..
            },
        ) => match protocol.icmp_filter() {
            Some((t, c)) => *icmp_type == Some(t) && *icmp_code == Some(c),
            None => true,
        },
        (_, LiveRule::TcpUdp { transport, .. }) => match protocol.transport() {
            Some((declared, range)) => {
                let wanted = range
                    .map(|r| (r.minimum_port, r.maximum_port))
                    .unwrap_or((MIN_PORT, MAX_PORT));
                declared == *transport && live.port_range() == Some(wanted)
            }
            None => false,
        },
        _ => false,
    }
}
