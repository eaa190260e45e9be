// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Capabilities the reconciler needs from the cloud account.
//!
//! Lookups by ID return `Ok(None)` when the cloud reports the resource as not
//! found, lookups by name return `Ok(None)` when nothing carries that name.

pub mod model;

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::CloudError;
use model::*;

pub type CloudResult<T> = std::result::Result<T, CloudError>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceManager: Send + Sync {
    async fn list_resource_groups_by_name(&self, name: &str) -> CloudResult<Vec<ResourceGroup>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait VpcApi: Send + Sync {
    async fn get_vpc(&self, id: &str) -> CloudResult<Option<Vpc>>;
    async fn get_vpc_by_name(&self, name: &str) -> CloudResult<Option<Vpc>>;
    async fn create_vpc(&self, prototype: &VpcPrototype) -> CloudResult<Vpc>;

    /// Names of the availability zones of `region`
    async fn list_zones(&self, region: &str) -> CloudResult<Vec<String>>;

    async fn get_subnet(&self, id: &str) -> CloudResult<Option<Subnet>>;
    async fn get_subnet_by_name(&self, name: &str) -> CloudResult<Option<Subnet>>;
    async fn create_subnet(&self, prototype: &SubnetPrototype) -> CloudResult<Subnet>;

    async fn get_public_gateway(&self, id: &str) -> CloudResult<Option<PublicGateway>>;
    async fn get_public_gateway_by_name(
        &self,
        name: &str,
        resource_group_id: &str,
    ) -> CloudResult<Option<PublicGateway>>;
    async fn create_public_gateway(
        &self,
        prototype: &PublicGatewayPrototype,
    ) -> CloudResult<PublicGateway>;

    async fn get_security_group(&self, id: &str) -> CloudResult<Option<SecurityGroup>>;
    async fn get_security_group_by_name(&self, name: &str) -> CloudResult<Option<SecurityGroup>>;
    async fn create_security_group(
        &self,
        prototype: &SecurityGroupPrototype,
    ) -> CloudResult<SecurityGroup>;
    async fn list_security_group_rules(&self, security_group_id: &str) -> CloudResult<Vec<LiveRule>>;
    async fn create_security_group_rule(
        &self,
        security_group_id: &str,
        prototype: &SecurityGroupRulePrototype,
    ) -> CloudResult<LiveRule>;

    async fn get_load_balancer(&self, id: &str) -> CloudResult<Option<LoadBalancer>>;
    async fn get_load_balancer_by_name(&self, name: &str) -> CloudResult<Option<LoadBalancer>>;
    async fn create_load_balancer(
        &self,
        prototype: &LoadBalancerPrototype,
    ) -> CloudResult<LoadBalancer>;

    async fn get_image(&self, id: &str) -> CloudResult<Option<Image>>;
    async fn get_image_by_name(&self, name: &str) -> CloudResult<Option<Image>>;
    async fn create_image(&self, prototype: &ImagePrototype) -> CloudResult<Image>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait GlobalTagging: Send + Sync {
    /// All user tags of the account
    async fn list_user_tags(&self) -> CloudResult<Vec<Tag>>;
    async fn create_tag(&self, name: &str) -> CloudResult<Tag>;
    async fn attach_tag(&self, name: &str, crn: &str) -> CloudResult<()>;
}

/// The collaborators of one cloud account.
#[derive(Clone)]
pub struct CloudClients {
    pub resource_manager: Arc<dyn ResourceManager>,
    pub vpc: Arc<dyn VpcApi>,
    pub tagging: Arc<dyn GlobalTagging>,
}

impl CloudClients {
    pub fn new(
        resource_manager: Arc<dyn ResourceManager>,
        vpc: Arc<dyn VpcApi>,
        tagging: Arc<dyn GlobalTagging>,
    ) -> Self {
        Self {
            resource_manager,
            vpc,
            tagging,
        }
    }
}
