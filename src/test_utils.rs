// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and Cluster API topologies.

use async_trait::async_trait;
use http::{Request, Response};
use kube::api::{ApiResource, DynamicObject};
use kube::client::Body;
use kube::core::{ErrorResponse, GroupVersionKind};
use kube::{Client, ResourceExt};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

use crate::constants::{groups, labels};
use crate::error::{DescribeError, Result};
use crate::kubernetes::client::{describe_target, ResourceClient};

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses.get(&(method.to_string(), path.to_string())).cloned()
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
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, not_found_json("path", &path)));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create an `/apis` response serving one version per group
pub fn api_group_list_json(groups: &[(&str, &str)]) -> String {
    let groups: Vec<Value> = groups
        .iter()
        .map(|(name, version)| {
            let group_version = json!({"groupVersion": format!("{}/{}", name, version), "version": version});
            json!({
                "name": name,
                "versions": [group_version.clone()],
                "preferredVersion": group_version
            })
        })
        .collect();

    json!({"kind": "APIGroupList", "apiVersion": "v1", "groups": groups}).to_string()
}

/// Create an `/apis/{group}/{version}` response with namespaced kinds
pub fn api_resource_list_json(group_version: &str, kinds: &[&str]) -> String {
    let resources: Vec<Value> = kinds
        .iter()
        .map(|kind| {
            json!({
                "name": format!("{}s", kind.to_lowercase()),
                "singularName": kind.to_lowercase(),
                "namespaced": true,
                "kind": kind,
                "verbs": ["get", "list", "watch"]
            })
        })
        .collect();

    json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version,
        "resources": resources
    })
    .to_string()
}

fn api_resource(api_version: &str, kind: &str) -> ApiResource {
    let (group, version) = api_version.split_once('/').unwrap_or(("", api_version));
    ApiResource::from_gvk(&GroupVersionKind::gvk(group, version, kind))
}

fn selector_matches(obj: &DynamicObject, selector: &str) -> bool {
    let labels = obj.labels();
    selector
        .split(',')
        .filter(|s| !s.is_empty())
        .all(|requirement| match requirement.split_once('=') {
            Some((key, value)) => labels.get(key).map(String::as_str) == Some(value),
            None => labels.contains_key(requirement),
        })
}

/// In-memory [`ResourceClient`] serving a fixed set of objects
#[derive(Default)]
pub struct FakeResourceClient {
    objects: Vec<DynamicObject>,
    resources: HashMap<(String, String), ApiResource>,
    failing_lists: HashSet<String>,
    failing_gets: HashSet<String>,
}

impl FakeResourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve an object; its kind becomes resolvable
    pub fn with_object(mut self, obj: DynamicObject) -> Self {
        let types = obj.types.clone().unwrap_or_default();
        self = self.with_kind(&types.api_version, &types.kind);
        self.objects.push(obj);
        self
    }

    pub fn with_objects(self, objects: impl IntoIterator<Item = DynamicObject>) -> Self {
        objects.into_iter().fold(self, |client, obj| client.with_object(obj))
    }

    /// Make a kind resolvable without serving any object of it
    pub fn with_kind(mut self, api_version: &str, kind: &str) -> Self {
        let resource = api_resource(api_version, kind);
        self.resources
            .insert((resource.group.clone(), kind.to_string()), resource);
        self
    }

    /// Fail every list of the given kind with a server error
    pub fn failing_list(mut self, kind: &str) -> Self {
        self.failing_lists.insert(kind.to_string());
        self
    }

    /// Fail every get of the given kind with a server error
    pub fn failing_get(mut self, kind: &str) -> Self {
        self.failing_gets.insert(kind.to_string());
        self
    }

    fn matches(obj: &DynamicObject, resource: &ApiResource, namespace: &str) -> bool {
        obj.types
            .as_ref()
            .is_some_and(|t| t.api_version == resource.api_version && t.kind == resource.kind)
            && obj.namespace().as_deref() == Some(namespace)
    }
}

fn server_error(resource: &ApiResource, namespace: &str, name: &str) -> DescribeError {
    DescribeError::Transport {
        resource: describe_target(resource, namespace, name),
        source: kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "etcd unavailable".to_string(),
            reason: "InternalError".to_string(),
            code: 500,
        }),
    }
}

#[async_trait]
impl ResourceClient for FakeResourceClient {
    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<DynamicObject> {
        if self.failing_gets.contains(&resource.kind) {
            return Err(server_error(resource, namespace, name));
        }

        self.objects
            .iter()
            .find(|obj| Self::matches(obj, resource, namespace) && obj.name_any() == name)
            .cloned()
            .ok_or_else(|| DescribeError::NotFound {
                resource: describe_target(resource, namespace, name),
            })
    }

    async fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<DynamicObject>> {
        if self.failing_lists.contains(&resource.kind) {
            return Err(server_error(resource, namespace, "*"));
        }

        Ok(self
            .objects
            .iter()
            .filter(|obj| Self::matches(obj, resource, namespace) && selector_matches(obj, label_selector))
            .cloned()
            .collect())
    }

    async fn resolve(&self, api_group: &str, kind: &str) -> Result<ApiResource> {
        self.resources
            .get(&(api_group.to_string(), kind.to_string()))
            .cloned()
            .ok_or_else(|| DescribeError::NotFound {
                resource: format!("{}, Kind={}", api_group, kind),
            })
    }
}

pub const INFRA_CLUSTER_KIND: &str = "GenericInfrastructureCluster";
pub const INFRA_MACHINE_KIND: &str = "GenericInfrastructureMachine";
pub const INFRA_MACHINE_TEMPLATE_KIND: &str = "GenericInfrastructureMachineTemplate";
pub const CONTROL_PLANE_KIND: &str = "GenericControlPlane";
pub const BOOTSTRAP_CONFIG_KIND: &str = "GenericBootstrapConfig";
pub const BOOTSTRAP_CONFIG_TEMPLATE_KIND: &str = "GenericBootstrapConfigTemplate";

fn capi_version(group: &str) -> String {
    format!("{}/v1beta2", group)
}

fn reference(group: &str, kind: &str, name: &str) -> Value {
    json!({"apiGroup": group, "kind": kind, "name": name})
}

fn owner(kind: &str, name: &str) -> Value {
    json!({
        "apiVersion": capi_version(groups::CLUSTER),
        "kind": kind,
        "name": name,
        "uid": format!("{}-uid", name),
        "controller": true
    })
}

fn object(api_version: &str, kind: &str, namespace: &str, name: &str, body: Value) -> DynamicObject {
    let mut value = json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {"name": name, "namespace": namespace}
    });
    if let (Some(target), Value::Object(fields)) = (value.as_object_mut(), body) {
        for (key, field) in fields {
            if key == "metadata" {
                if let (Some(meta), Value::Object(extra)) = (target.get_mut("metadata"), field) {
                    if let Some(meta) = meta.as_object_mut() {
                        meta.extend(extra);
                    }
                }
            } else {
                target.insert(key, field);
            }
        }
    }
    serde_json::from_value(value).unwrap()
}

fn cluster_labels(cluster: &str) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(labels::CLUSTER_NAME.to_string(), json!(cluster));
    Value::Object(map)
}

fn ready_status(ready: Option<&str>) -> Value {
    match ready {
        Some(status) => json!({"conditions": [{"type": "Ready", "status": status, "reason": status}]}),
        None => json!({}),
    }
}

/// A Machine with its infrastructure machine and bootstrap config
#[derive(Clone)]
pub struct FakeMachine {
    name: String,
    ready: Option<String>,
}

impl FakeMachine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ready: None,
        }
    }

    pub fn with_ready(mut self, status: &str) -> Self {
        self.ready = Some(status.to_string());
        self
    }

    fn objects(
        &self,
        namespace: &str,
        cluster: &str,
        owner_ref: Value,
        static_bootstrap: bool,
    ) -> Vec<DynamicObject> {
        let bootstrap = if static_bootstrap {
            json!({"dataSecretName": format!("{}-bootstrap", self.name)})
        } else {
            json!({"configRef": reference(groups::BOOTSTRAP, BOOTSTRAP_CONFIG_KIND, &self.name)})
        };

        let mut objects = vec![
            object(
                &capi_version(groups::CLUSTER),
                "Machine",
                namespace,
                &self.name,
                json!({
                    "metadata": {
                        "labels": cluster_labels(cluster),
                        "ownerReferences": [owner_ref]
                    },
                    "spec": {
                        "clusterName": cluster,
                        "bootstrap": bootstrap,
                        "infrastructureRef": reference(groups::INFRASTRUCTURE, INFRA_MACHINE_KIND, &self.name)
                    },
                    "status": ready_status(self.ready.as_deref())
                }),
            ),
            object(
                &capi_version(groups::INFRASTRUCTURE),
                INFRA_MACHINE_KIND,
                namespace,
                &self.name,
                json!({}),
            ),
        ];
        if !static_bootstrap {
            objects.push(object(
                &capi_version(groups::BOOTSTRAP),
                BOOTSTRAP_CONFIG_KIND,
                namespace,
                &self.name,
                json!({}),
            ));
        }
        objects
    }
}

#[derive(Clone)]
pub struct FakeControlPlane {
    name: String,
    machines: Vec<FakeMachine>,
}

impl FakeControlPlane {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            machines: Vec::new(),
        }
    }

    pub fn with_machine(mut self, machine: FakeMachine) -> Self {
        self.machines.push(machine);
        self
    }
}

fn machine_template(name: &str, static_bootstrap: bool) -> Value {
    let bootstrap = if static_bootstrap {
        json!({"dataSecretName": format!("{}-bootstrap", name)})
    } else {
        json!({"configRef": reference(groups::BOOTSTRAP, BOOTSTRAP_CONFIG_TEMPLATE_KIND, name)})
    };
    json!({
        "spec": {
            "bootstrap": bootstrap,
            "infrastructureRef": reference(groups::INFRASTRUCTURE, INFRA_MACHINE_TEMPLATE_KIND, name)
        }
    })
}

/// A MachineDeployment with one MachineSet owning its machines
#[derive(Clone)]
pub struct FakeMachineDeployment {
    name: String,
    template: Option<String>,
    static_bootstrap: bool,
    machines: Vec<FakeMachine>,
}

impl FakeMachineDeployment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            template: None,
            static_bootstrap: false,
            machines: Vec::new(),
        }
    }

    /// Reference templates named `name` instead of the deployment's own name
    pub fn with_template(mut self, name: &str) -> Self {
        self.template = Some(name.to_string());
        self
    }

    pub fn with_static_bootstrap(mut self) -> Self {
        self.static_bootstrap = true;
        self
    }

    pub fn with_machine(mut self, machine: FakeMachine) -> Self {
        self.machines.push(machine);
        self
    }
}

#[derive(Clone)]
pub struct FakeMachinePool {
    name: String,
    machines: Vec<FakeMachine>,
}

impl FakeMachinePool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            machines: Vec::new(),
        }
    }

    pub fn with_machine(mut self, machine: FakeMachine) -> Self {
        self.machines.push(machine);
        self
    }
}

/// A Cluster with infrastructure and optional control plane, workers and resource sets
pub struct FakeCluster {
    namespace: String,
    name: String,
    control_plane: Option<FakeControlPlane>,
    deployments: Vec<FakeMachineDeployment>,
    pools: Vec<FakeMachinePool>,
    resource_sets: Vec<String>,
}

impl FakeCluster {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            control_plane: None,
            deployments: Vec::new(),
            pools: Vec::new(),
            resource_sets: Vec::new(),
        }
    }

    pub fn with_control_plane(mut self, control_plane: FakeControlPlane) -> Self {
        self.control_plane = Some(control_plane);
        self
    }

    pub fn with_machine_deployment(mut self, deployment: FakeMachineDeployment) -> Self {
        self.deployments.push(deployment);
        self
    }

    pub fn with_machine_pool(mut self, pool: FakeMachinePool) -> Self {
        self.pools.push(pool);
        self
    }

    /// Apply a ClusterResourceSet to the cluster
    pub fn with_resource_set(mut self, name: &str) -> Self {
        self.resource_sets.push(name.to_string());
        self
    }

    fn labels(&self) -> Value {
        cluster_labels(&self.name)
    }

    pub fn objects(&self) -> Vec<DynamicObject> {
        let ns = self.namespace.as_str();
        let cluster = self.name.as_str();
        let mut objects = Vec::new();

        let mut spec = json!({
            "infrastructureRef": reference(groups::INFRASTRUCTURE, INFRA_CLUSTER_KIND, cluster)
        });
        if let Some(cp) = &self.control_plane {
            spec["controlPlaneRef"] = reference(groups::CONTROL_PLANE, CONTROL_PLANE_KIND, &cp.name);
        }
        objects.push(object(
            &capi_version(groups::CLUSTER),
            "Cluster",
            ns,
            cluster,
            json!({"spec": spec, "status": ready_status(Some("True"))}),
        ));
        objects.push(object(
            &capi_version(groups::INFRASTRUCTURE),
            INFRA_CLUSTER_KIND,
            ns,
            cluster,
            json!({}),
        ));

        if let Some(cp) = &self.control_plane {
            objects.push(object(
                &capi_version(groups::CONTROL_PLANE),
                CONTROL_PLANE_KIND,
                ns,
                &cp.name,
                json!({
                    "metadata": {"labels": self.labels()},
                    "spec": {"machineTemplate": {"spec": {
                        "infrastructureRef": reference(groups::INFRASTRUCTURE, INFRA_MACHINE_TEMPLATE_KIND, &cp.name)
                    }}},
                    "status": ready_status(Some("True"))
                }),
            ));
            for machine in &cp.machines {
                objects.extend(machine.objects(ns, cluster, json!({
                    "apiVersion": capi_version(groups::CONTROL_PLANE),
                    "kind": CONTROL_PLANE_KIND,
                    "name": cp.name,
                    "uid": format!("{}-uid", cp.name),
                    "controller": true
                }), false));
            }
        }

        for md in &self.deployments {
            let ms_name = format!("{}-ms", md.name);
            objects.push(object(
                &capi_version(groups::CLUSTER),
                "MachineDeployment",
                ns,
                &md.name,
                json!({
                    "metadata": {"labels": self.labels()},
                    "spec": {
                        "clusterName": cluster,
                        "replicas": md.machines.len(),
                        "template": machine_template(md.template.as_deref().unwrap_or(&md.name), md.static_bootstrap)
                    }
                }),
            ));
            objects.push(object(
                &capi_version(groups::CLUSTER),
                "MachineSet",
                ns,
                &ms_name,
                json!({
                    "metadata": {
                        "labels": self.labels(),
                        "ownerReferences": [owner("MachineDeployment", &md.name)]
                    },
                    "spec": {"clusterName": cluster, "replicas": md.machines.len()}
                }),
            ));
            for machine in &md.machines {
                objects.extend(machine.objects(ns, cluster, owner("MachineSet", &ms_name), md.static_bootstrap));
            }
        }

        for mp in &self.pools {
            objects.push(object(
                &capi_version(groups::CLUSTER),
                "MachinePool",
                ns,
                &mp.name,
                json!({
                    "metadata": {"labels": self.labels()},
                    "spec": {
                        "clusterName": cluster,
                        "replicas": mp.machines.len(),
                        "template": machine_template(&mp.name, false)
                    }
                }),
            ));
            for machine in &mp.machines {
                objects.extend(machine.objects(ns, cluster, owner("MachinePool", &mp.name), false));
            }
        }

        if !self.resource_sets.is_empty() {
            for crs in &self.resource_sets {
                objects.push(object(
                    &capi_version(groups::ADDONS),
                    "ClusterResourceSet",
                    ns,
                    crs,
                    json!({"spec": {"strategy": "ApplyOnce"}}),
                ));
            }
            let bindings: Vec<Value> = self
                .resource_sets
                .iter()
                .map(|crs| json!({"clusterResourceSetName": crs}))
                .collect();
            objects.push(object(
                &capi_version(groups::ADDONS),
                "ClusterResourceSetBinding",
                ns,
                cluster,
                json!({"spec": {"clusterName": cluster, "bindings": bindings}}),
            ));
        }

        objects
    }

    /// A client serving every object of the cluster; template kinds resolve
    /// but no template object exists.
    pub fn client(&self) -> FakeResourceClient {
        FakeResourceClient::new()
            .with_objects(self.objects())
            .with_kind(&capi_version(groups::INFRASTRUCTURE), INFRA_MACHINE_TEMPLATE_KIND)
            .with_kind(&capi_version(groups::BOOTSTRAP), BOOTSTRAP_CONFIG_TEMPLATE_KIND)
    }
}
