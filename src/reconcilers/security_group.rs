// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Security groups and their rules, reconciled in two phases.
//!
//! Phase one resolves or creates every declared group. Rules may reference
//! other groups, so phase two only runs in a pass where no group had to be
//! created.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::rule_matcher::RuleMatcher;
use super::tagging::tag_resource;
use super::{ClusterScope, Outcome, Reconcile};
use crate::cloud::model::{SecurityGroupPrototype, SecurityGroupRulePrototype};
use crate::error::{ReconcileError, Result};
use crate::status::StatusKind;
use crate::types::network::VpcResourceStatus;
use crate::types::security_group::{SecurityGroup, SecurityGroupRule};
use crate::types::ResourceKind;

pub struct SecurityGroupReconciler;

/// A declared group together with its live identity
struct ResolvedGroup<'s> {
    id: String,
    name: String,
    declared: &'s SecurityGroup,
}

#[async_trait]
impl Reconcile for SecurityGroupReconciler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::SecurityGroup
    }

    #[instrument(skip_all, fields(cluster = %scope.cluster_name))]
    async fn reconcile(&self, scope: &mut ClusterScope<'_>) -> Result<Outcome> {
        let spec = scope.spec;
        let declared = &spec.network.security_groups;
        if declared.is_empty() {
            return Ok(Outcome::Ready);
        }

        let mut resolved = Vec::with_capacity(declared.len());
        let mut created_any = false;
        for group in declared {
            let (group, created) = resolve_group(scope, group).await?;
            created_any |= created;
            resolved.push(group);
        }

        if created_any {
            info!("Created security groups, rules are reconciled on the next pass");
            return Ok(Outcome::Requeue);
        }

        let mut matcher = RuleMatcher::new();
        let mut outcome = Outcome::Ready;
        for group in &resolved {
            for rule in &group.declared.rules {
                let matched = reconcile_rule(scope, &mut matcher, group, rule).await?;
                outcome = outcome.and(Outcome::from_requeue(!matched));
            }
        }
        Ok(outcome)
    }
}

/// Resolve a declared group by cache, spec ID or name, creating it when absent.
/// Returns whether the group was created.
async fn resolve_group<'s>(
    scope: &mut ClusterScope<'_>,
    group: &'s SecurityGroup,
) -> Result<(ResolvedGroup<'s>, bool)> {
    let clouds = scope.clouds;
    let vpc_api = &clouds.vpc;
    let name = group.name.as_deref().filter(|n| !n.is_empty());
    let spec_id = group.id.as_deref().filter(|id| !id.is_empty());

    let cached = match (name, spec_id) {
        (Some(name), _) => scope.status.get(StatusKind::SecurityGroup, name).cloned(),
        (None, Some(id)) => scope
            .status
            .entries(StatusKind::SecurityGroup)
            .find(|(_, status)| status.id == id)
            .map(|(_, status)| status.clone()),
        (None, None) => None,
    };
    if let Some(cached) = cached.filter(|c| !c.id.is_empty()) {
        return Ok((
            ResolvedGroup {
                id: cached.id,
                name: cached.name,
                declared: group,
            },
            false,
        ));
    }

    let live = match (spec_id, name) {
        (Some(id), _) => Some(
            scope
                .call(ResourceKind::SecurityGroup, "get", id, vpc_api.get_security_group(id))
                .await?
                .ok_or_else(|| {
                    ReconcileError::not_found(
                        ResourceKind::SecurityGroup,
                        id,
                        "no security group with this ID",
                    )
                })?,
        ),
        (None, Some(name)) => {
            scope
                .call(
                    ResourceKind::SecurityGroup,
                    "get",
                    name,
                    vpc_api.get_security_group_by_name(name),
                )
                .await?
        }
        (None, None) => {
            return Err(ReconcileError::precondition(
                ResourceKind::SecurityGroup,
                "<unnamed>",
                "security group needs a name or an ID",
            ))
        }
    };

    if let Some(live) = live {
        debug!("Found security group {} ({})", live.name, live.id);
        // Keyed like the cache lookup above: declared name first
        let key = name.unwrap_or(live.name.as_str()).to_string();
        scope.status.put(
            StatusKind::SecurityGroup,
            &key,
            VpcResourceStatus::new(live.id.clone(), live.name.clone(), true),
        );
        return Ok((
            ResolvedGroup {
                id: live.id,
                name: live.name,
                declared: group,
            },
            false,
        ));
    }

    // Only reachable with a name and no ID
    let name = group.display_name().to_string();
    let prototype = SecurityGroupPrototype {
        name: name.clone(),
        vpc_id: scope.vpc_id()?,
        resource_group_id: scope.resource_group_id()?,
    };
    let created = scope
        .call(
            ResourceKind::SecurityGroup,
            "create",
            &name,
            vpc_api.create_security_group(&prototype),
        )
        .await?;
    info!("Created security group {} ({})", name, created.id);
    scope.status.put(
        StatusKind::SecurityGroup,
        &name,
        VpcResourceStatus::new(created.id.clone(), name.clone(), true),
    );

    tag_resource(scope, ResourceKind::SecurityGroup, &name, &created.crn).await?;
    Ok((
        ResolvedGroup {
            id: created.id,
            name,
            declared: group,
        },
        true,
    ))
}

/// Create one live rule per declared remote that no live rule satisfies yet.
/// Returns true when every remote was already matched.
#[instrument(skip_all, fields(security_group = %group.name, direction = %rule.direction()))]
async fn reconcile_rule(
    scope: &ClusterScope<'_>,
    matcher: &mut RuleMatcher,
    group: &ResolvedGroup<'_>,
    rule: &SecurityGroupRule,
) -> Result<bool> {
    let vpc_api = &scope.clouds.vpc;
    let direction = rule.direction();
    let prototype = rule.prototype();

    let live_rules = scope
        .call(
            ResourceKind::SecurityGroupRule,
            "list",
            &group.name,
            vpc_api.list_security_group_rules(&group.id),
        )
        .await?;

    let mut all_matched = true;
    for remote in &prototype.remotes {
        let mut matched = false;
        if !live_rules.is_empty() {
            for live in &live_rules {
                if matcher
                    .matches(scope, direction, &prototype.protocol, remote, live)
                    .await?
                {
                    debug!("Rule {} {} from {} satisfied by {}", direction, prototype.protocol, remote, live.id());
                    matched = true;
                    break;
                }
            }
        }
        if matched {
            continue;
        }

        all_matched = false;
        let request = SecurityGroupRulePrototype {
            direction,
            protocol: prototype.protocol.clone(),
            remote: matcher.remote_prototype(scope, remote).await?,
        };
        let created = scope
            .call(
                ResourceKind::SecurityGroupRule,
                "create",
                &group.name,
                vpc_api.create_security_group_rule(&group.id, &request),
            )
            .await?;
        info!(
            "Created {} {} rule {} for {} in security group {}",
            direction,
            prototype.protocol,
            created.id(),
            remote,
            group.name
        );
    }

    Ok(all_matched)
}
