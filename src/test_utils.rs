// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API and an in-memory cloud account.

use async_trait::async_trait;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tower::Service;

use crate::cloud::model::*;
use crate::cloud::{CloudClients, CloudResult, GlobalTagging, ResourceManager, VpcApi};
use crate::error::CloudError;
use crate::types::cluster::{VpcCluster, VpcClusterSpec};
use crate::types::network::{LoadBalancerState, NetworkSpec};

/// Install a tracing subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("PATCH".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    /// Requests received so far as (method, path, body)
    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let bytes = req.into_body().collect().await?.to_bytes();
            requests.lock().unwrap().push((
                method,
                path,
                String::from_utf8_lossy(&bytes).to_string(),
            ));

            let (status, body) = response.unwrap_or_else(|| {
                (
                    404,
                    r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#
                        .to_string(),
                )
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Path of the status subresource of a `VpcCluster`
pub fn status_path(namespace: &str, name: &str) -> String {
    format!(
        "/apis/infrastructure.cluster.x-k8s.io/v1beta2/namespaces/{}/vpcclusters/{}/status",
        namespace, name
    )
}

/// A `VpcCluster` in `us-south` with an empty network spec
pub fn make_cluster(name: &str) -> VpcCluster {
    make_cluster_with_network(name, NetworkSpec::default())
}

pub fn make_cluster_with_network(name: &str, network: NetworkSpec) -> VpcCluster {
    VpcCluster {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        spec: VpcClusterSpec {
            region: "us-south".to_string(),
            resource_group: String::new(),
            network,
            image: None,
            api_server_port: None,
        },
        status: None,
    }
}

/// In-memory cloud account state.
#[derive(Default)]
pub struct FakeState {
    pub resource_groups: Vec<ResourceGroup>,
    pub zones: BTreeMap<String, Vec<String>>,
    pub vpcs: Vec<Vpc>,
    pub subnets: Vec<Subnet>,
    pub public_gateways: Vec<PublicGateway>,
    pub security_groups: Vec<SecurityGroup>,
    /// Live rules keyed by security group ID
    pub rules: BTreeMap<String, Vec<LiveRule>>,
    pub load_balancers: Vec<LoadBalancer>,
    pub images: Vec<Image>,
    pub tags: Vec<String>,
    /// Attached (tag, crn) pairs
    pub attachments: Vec<(String, String)>,

    pub vpc_prototypes: Vec<VpcPrototype>,
    pub subnet_prototypes: Vec<SubnetPrototype>,
    pub public_gateway_prototypes: Vec<PublicGatewayPrototype>,
    pub security_group_prototypes: Vec<SecurityGroupPrototype>,
    /// Created rules as (security group ID, prototype)
    pub rule_prototypes: Vec<(String, SecurityGroupRulePrototype)>,
    pub load_balancer_prototypes: Vec<LoadBalancerPrototype>,
    pub image_prototypes: Vec<ImagePrototype>,

    calls: BTreeMap<String, usize>,
    failures: BTreeMap<String, CloudError>,
    next_id: usize,
}

impl FakeState {
    fn record(&mut self, operation: &str) -> CloudResult<()> {
        *self.calls.entry(operation.to_string()).or_default() += 1;
        match self.failures.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

fn crn(kind: &str, id: &str) -> String {
    format!("crn:v1:bluemix:public:is:us-south:a/acct::{}:{}", kind, id)
}

/// A stateful fake of the three cloud collaborators. Newly created VPCs,
/// subnets and images start `Pending`, load balancers `CreatePending`.
#[derive(Clone, Default)]
pub struct FakeCloud {
    state: Arc<Mutex<FakeState>>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clients(&self) -> CloudClients {
        CloudClients::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn with_resource_group(self, id: &str, name: &str) -> Self {
        self.state().resource_groups.push(ResourceGroup {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_zones(self, region: &str, zones: &[&str]) -> Self {
        self.state().zones.insert(
            region.to_string(),
            zones.iter().map(|z| z.to_string()).collect(),
        );
        self
    }

    pub fn with_vpc(self, id: &str, name: &str, state: ResourceState) -> Self {
        self.state().vpcs.push(Vpc {
            id: id.to_string(),
            name: name.to_string(),
            crn: crn("vpc", id),
            state,
        });
        self
    }

    pub fn with_subnet(self, id: &str, name: &str, zone: &str, cidr: &str, state: ResourceState) -> Self {
        self.state().subnets.push(Subnet {
            id: id.to_string(),
            name: name.to_string(),
            crn: crn("subnet", id),
            zone: zone.to_string(),
            ipv4_cidr_block: Some(cidr.to_string()),
            state,
        });
        self
    }

    pub fn with_public_gateway(self, id: &str, name: &str, zone: &str) -> Self {
        self.state().public_gateways.push(PublicGateway {
            id: id.to_string(),
            name: name.to_string(),
            crn: crn("public-gateway", id),
            zone: zone.to_string(),
            state: ResourceState::Available,
        });
        self
    }

    pub fn with_security_group(self, id: &str, name: &str) -> Self {
        self.state().security_groups.push(SecurityGroup {
            id: id.to_string(),
            name: name.to_string(),
            crn: crn("security-group", id),
        });
        self
    }

    pub fn with_rule(self, security_group_id: &str, rule: LiveRule) -> Self {
        self.state()
            .rules
            .entry(security_group_id.to_string())
            .or_default()
            .push(rule);
        self
    }

    pub fn with_load_balancer(self, id: &str, name: &str, state: LoadBalancerState) -> Self {
        self.state().load_balancers.push(LoadBalancer {
            id: id.to_string(),
            name: name.to_string(),
            crn: crn("load-balancer", id),
            state,
            hostname: Some(format!("{}.lb.example", id)),
        });
        self
    }

    pub fn with_image(self, id: &str, name: &str, state: ResourceState) -> Self {
        self.state().images.push(Image {
            id: id.to_string(),
            name: name.to_string(),
            crn: crn("image", id),
            state,
        });
        self
    }

    pub fn with_tag(self, name: &str) -> Self {
        self.state().tags.push(name.to_string());
        self
    }

    /// Make every call to `operation` fail with `error`
    pub fn failing(self, operation: &str, error: CloudError) -> Self {
        self.state().failures.insert(operation.to_string(), error);
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state().calls.get(operation).copied().unwrap_or(0)
    }

    /// Number of create calls across all resource kinds, tags excluded
    pub fn creates(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|(op, _)| op.starts_with("create_") && op.as_str() != "create_tag")
            .map(|(_, n)| n)
            .sum()
    }

    /// Finish provisioning of everything created so far
    pub fn provision_all(&self) {
        let mut state = self.state();
        state.vpcs.iter_mut().for_each(|v| v.state = ResourceState::Available);
        state.subnets.iter_mut().for_each(|s| s.state = ResourceState::Available);
        state.images.iter_mut().for_each(|i| i.state = ResourceState::Available);
        state
            .load_balancers
            .iter_mut()
            .for_each(|lb| lb.state = LoadBalancerState::Active);
    }

    pub fn crn_of_security_group(&self, id: &str) -> String {
        crn("security-group", id)
    }
}

#[async_trait]
impl ResourceManager for FakeCloud {
    async fn list_resource_groups_by_name(&self, name: &str) -> CloudResult<Vec<ResourceGroup>> {
        let mut state = self.state();
        state.record("list_resource_groups_by_name")?;
        Ok(state
            .resource_groups
            .iter()
            .filter(|rg| rg.name == name)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VpcApi for FakeCloud {
    async fn get_vpc(&self, id: &str) -> CloudResult<Option<Vpc>> {
        let mut state = self.state();
        state.record("get_vpc")?;
        Ok(state.vpcs.iter().find(|v| v.id == id).cloned())
    }

    async fn get_vpc_by_name(&self, name: &str) -> CloudResult<Option<Vpc>> {
        let mut state = self.state();
        state.record("get_vpc_by_name")?;
        Ok(state.vpcs.iter().find(|v| v.name == name).cloned())
    }

    async fn create_vpc(&self, prototype: &VpcPrototype) -> CloudResult<Vpc> {
        let mut state = self.state();
        state.record("create_vpc")?;
        let id = state.next_id("vpc");
        let vpc = Vpc {
            crn: crn("vpc", &id),
            id,
            name: prototype.name.clone(),
            state: ResourceState::Pending,
        };
        state.vpc_prototypes.push(prototype.clone());
        state.vpcs.push(vpc.clone());
        Ok(vpc)
    }

    async fn list_zones(&self, region: &str) -> CloudResult<Vec<String>> {
        let mut state = self.state();
        state.record("list_zones")?;
        Ok(state.zones.get(region).cloned().unwrap_or_default())
    }

    async fn get_subnet(&self, id: &str) -> CloudResult<Option<Subnet>> {
        let mut state = self.state();
        state.record("get_subnet")?;
        Ok(state.subnets.iter().find(|s| s.id == id).cloned())
    }

    async fn get_subnet_by_name(&self, name: &str) -> CloudResult<Option<Subnet>> {
        let mut state = self.state();
        state.record("get_subnet_by_name")?;
        Ok(state.subnets.iter().find(|s| s.name == name).cloned())
    }

    async fn create_subnet(&self, prototype: &SubnetPrototype) -> CloudResult<Subnet> {
        let mut state = self.state();
        state.record("create_subnet")?;
        let id = state.next_id("subnet");
        let subnet = Subnet {
            crn: crn("subnet", &id),
            ipv4_cidr_block: Some(format!("10.240.{}.0/24", state.subnets.len())),
            id,
            name: prototype.name.clone(),
            zone: prototype.zone.clone(),
            state: ResourceState::Pending,
        };
        state.subnet_prototypes.push(prototype.clone());
        state.subnets.push(subnet.clone());
        Ok(subnet)
    }

    async fn get_public_gateway(&self, id: &str) -> CloudResult<Option<PublicGateway>> {
        let mut state = self.state();
        state.record("get_public_gateway")?;
        Ok(state.public_gateways.iter().find(|g| g.id == id).cloned())
    }

    async fn get_public_gateway_by_name(
        &self,
        name: &str,
        _resource_group_id: &str,
    ) -> CloudResult<Option<PublicGateway>> {
        let mut state = self.state();
        state.record("get_public_gateway_by_name")?;
        Ok(state.public_gateways.iter().find(|g| g.name == name).cloned())
    }

    async fn create_public_gateway(
        &self,
        prototype: &PublicGatewayPrototype,
    ) -> CloudResult<PublicGateway> {
        let mut state = self.state();
        state.record("create_public_gateway")?;
        let id = state.next_id("pgw");
        let gateway = PublicGateway {
            crn: crn("public-gateway", &id),
            id,
            name: prototype.name.clone(),
            zone: prototype.zone.clone(),
            state: ResourceState::Available,
        };
        state.public_gateway_prototypes.push(prototype.clone());
        state.public_gateways.push(gateway.clone());
        Ok(gateway)
    }

    async fn get_security_group(&self, id: &str) -> CloudResult<Option<SecurityGroup>> {
        let mut state = self.state();
        state.record("get_security_group")?;
        Ok(state.security_groups.iter().find(|g| g.id == id).cloned())
    }

    async fn get_security_group_by_name(&self, name: &str) -> CloudResult<Option<SecurityGroup>> {
        let mut state = self.state();
        state.record("get_security_group_by_name")?;
        Ok(state.security_groups.iter().find(|g| g.name == name).cloned())
    }

    async fn create_security_group(
        &self,
        prototype: &SecurityGroupPrototype,
    ) -> CloudResult<SecurityGroup> {
        let mut state = self.state();
        state.record("create_security_group")?;
        let id = state.next_id("sg");
        let group = SecurityGroup {
            crn: crn("security-group", &id),
            id,
            name: prototype.name.clone(),
        };
        state.security_group_prototypes.push(prototype.clone());
        state.security_groups.push(group.clone());
        Ok(group)
    }

    async fn list_security_group_rules(&self, security_group_id: &str) -> CloudResult<Vec<LiveRule>> {
        let mut state = self.state();
        state.record("list_security_group_rules")?;
        Ok(state.rules.get(security_group_id).cloned().unwrap_or_default())
    }

    async fn create_security_group_rule(
        &self,
        security_group_id: &str,
        prototype: &SecurityGroupRulePrototype,
    ) -> CloudResult<LiveRule> {
        let mut state = self.state();
        state.record("create_security_group_rule")?;
        let id = state.next_id("rule");
        let remote = match &prototype.remote {
            RemotePrototype::Cidr(cidr) => LiveRemote::Cidr(cidr.clone()),
            RemotePrototype::Address(ip) => LiveRemote::Ip(ip.clone()),
            RemotePrototype::SecurityGroupCrn(crn) => {
                let group = state.security_groups.iter().find(|g| &g.crn == crn);
                LiveRemote::SecurityGroup {
                    id: group.map(|g| g.id.clone()),
                    name: group.map(|g| g.name.clone()),
                    crn: Some(crn.clone()),
                }
            }
        };
        let rule = match &prototype.protocol {
            crate::types::security_group::Protocol::All => LiveRule::All {
                id,
                direction: prototype.direction,
                remote,
            },
            crate::types::security_group::Protocol::Icmp {
                icmp_type,
                icmp_code,
            } => LiveRule::Icmp {
                id,
                direction: prototype.direction,
                remote,
                icmp_type: *icmp_type,
                icmp_code: *icmp_code,
            },
            protocol => {
                let (transport, range) = protocol
                    .transport()
                    .expect("tcp or udp protocol");
                LiveRule::TcpUdp {
                    id,
                    direction: prototype.direction,
                    remote,
                    transport,
                    port_min: range.map(|r| r.minimum_port),
                    port_max: range.map(|r| r.maximum_port),
                }
            }
        };
        state
            .rule_prototypes
            .push((security_group_id.to_string(), prototype.clone()));
        state
            .rules
            .entry(security_group_id.to_string())
            .or_default()
            .push(rule.clone());
        Ok(rule)
    }

    async fn get_load_balancer(&self, id: &str) -> CloudResult<Option<LoadBalancer>> {
        let mut state = self.state();
        state.record("get_load_balancer")?;
        Ok(state.load_balancers.iter().find(|lb| lb.id == id).cloned())
    }

    async fn get_load_balancer_by_name(&self, name: &str) -> CloudResult<Option<LoadBalancer>> {
        let mut state = self.state();
        state.record("get_load_balancer_by_name")?;
        Ok(state.load_balancers.iter().find(|lb| lb.name == name).cloned())
    }

    async fn create_load_balancer(
        &self,
        prototype: &LoadBalancerPrototype,
    ) -> CloudResult<LoadBalancer> {
        let mut state = self.state();
        state.record("create_load_balancer")?;
        let id = state.next_id("lb");
        let lb = LoadBalancer {
            crn: crn("load-balancer", &id),
            hostname: None,
            id,
            name: prototype.name.clone(),
            state: LoadBalancerState::CreatePending,
        };
        state.load_balancer_prototypes.push(prototype.clone());
        state.load_balancers.push(lb.clone());
        Ok(lb)
    }

    async fn get_image(&self, id: &str) -> CloudResult<Option<Image>> {
        let mut state = self.state();
        state.record("get_image")?;
        Ok(state.images.iter().find(|i| i.id == id).cloned())
    }

    async fn get_image_by_name(&self, name: &str) -> CloudResult<Option<Image>> {
        let mut state = self.state();
        state.record("get_image_by_name")?;
        Ok(state.images.iter().find(|i| i.name == name).cloned())
    }

    async fn create_image(&self, prototype: &ImagePrototype) -> CloudResult<Image> {
        let mut state = self.state();
        state.record("create_image")?;
        let id = state.next_id("image");
        let image = Image {
            crn: crn("image", &id),
            id,
            name: prototype.name.clone(),
            state: ResourceState::Pending,
        };
        state.image_prototypes.push(prototype.clone());
        state.images.push(image.clone());
        Ok(image)
    }
}

#[async_trait]
impl GlobalTagging for FakeCloud {
    async fn list_user_tags(&self) -> CloudResult<Vec<Tag>> {
        let mut state = self.state();
        state.record("list_user_tags")?;
        Ok(state.tags.iter().map(|name| Tag { name: name.clone() }).collect())
    }

    async fn create_tag(&self, name: &str) -> CloudResult<Tag> {
        let mut state = self.state();
        state.record("create_tag")?;
        state.tags.push(name.to_string());
        Ok(Tag {
            name: name.to_string(),
        })
    }

    async fn attach_tag(&self, name: &str, crn: &str) -> CloudResult<()> {
        let mut state = self.state();
        state.record("attach_tag")?;
        state.attachments.push((name.to_string(), crn.to_string()));
        Ok(())
    }
}
