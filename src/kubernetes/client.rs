// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read-only access to cluster objects, typed and dynamic.

use std::collections::HashMap;

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::core::TypeMeta;
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{DescribeError, Result};
use crate::tree::NodeIdentity;

/// Fetches existing objects for the describe tree.
///
/// Implementations report a missing object as [`DescribeError::NotFound`]
/// and any other request failure as [`DescribeError::Transport`].
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<DynamicObject>;

    /// List objects of one kind in a namespace. An API that is not served
    /// yields an empty list.
    async fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<DynamicObject>>;

    /// Resolve the served version and plural of a provider kind
    async fn resolve(&self, api_group: &str, kind: &str) -> Result<ApiResource>;
}

/// Token naming the object a request was about, used in errors
pub fn describe_target(resource: &ApiResource, namespace: &str, name: &str) -> String {
    NodeIdentity::new(&resource.api_version, &resource.kind, namespace, name).token()
}

fn with_type_meta(mut obj: DynamicObject, resource: &ApiResource) -> DynamicObject {
    if obj.types.is_none() {
        obj.types = Some(TypeMeta {
            api_version: resource.api_version.clone(),
            kind: resource.kind.clone(),
        });
    }
    obj
}

/// [`ResourceClient`] backed by the Kubernetes API server
pub struct KubeResourceClient {
    client: Client,
    resolved: RwLock<HashMap<(String, String), ApiResource>>,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            resolved: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str) -> Result<DynamicObject> {
        let api: Api<DynamicObject> = Api::namespaced_with(self.client.clone(), namespace, resource);

        match api.get(name).await {
            Ok(obj) => Ok(with_type_meta(obj, resource)),
            Err(kube::Error::Api(err)) if err.code == 404 => Err(DescribeError::NotFound {
                resource: describe_target(resource, namespace, name),
            }),
            Err(e) => Err(DescribeError::Transport {
                resource: describe_target(resource, namespace, name),
                source: e,
            }),
        }
    }

    async fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<DynamicObject>> {
        let api: Api<DynamicObject> = Api::namespaced_with(self.client.clone(), namespace, resource);
        let mut lp = ListParams::default();
        if !label_selector.is_empty() {
            lp = lp.labels(label_selector);
        }

        match api.list(&lp).await {
            Ok(list) => Ok(list
                .items
                .into_iter()
                .map(|obj| with_type_meta(obj, resource))
                .collect()),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("{} is not served in {}, nothing to list", resource.kind, namespace);
                Ok(Vec::new())
            }
            Err(e) => Err(DescribeError::Transport {
                resource: describe_target(resource, namespace, "*"),
                source: e,
            }),
        }
    }

    async fn resolve(&self, api_group: &str, kind: &str) -> Result<ApiResource> {
        let key = (api_group.to_string(), kind.to_string());
        if let Some(resource) = self.resolved.read().await.get(&key) {
            return Ok(resource.clone());
        }

        let target = format!("{}, Kind={}", api_group, kind);
        let group = match kube::discovery::group(&self.client, api_group).await {
            Ok(group) => group,
            Err(kube::Error::Discovery(e)) => {
                debug!("Discovery of {} failed: {}", api_group, e);
                return Err(DescribeError::NotFound { resource: target });
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                return Err(DescribeError::NotFound { resource: target });
            }
            Err(e) => {
                return Err(DescribeError::Transport {
                    resource: target,
                    source: e,
                })
            }
        };

        let Some((resource, _)) = group.recommended_kind(kind) else {
            return Err(DescribeError::NotFound { resource: target });
        };

        debug!("Resolved {} to {}", target, resource.api_version);
        self.resolved.write().await.insert(key, resource.clone());
        Ok(resource)
    }
}

fn decode<K>(obj: DynamicObject, target: String) -> Result<K>
where
    K: DeserializeOwned,
{
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(|source| DescribeError::Decode {
            resource: target,
            source,
        })
}

/// Get a typed object
pub async fn get_typed<K, C>(client: &C, namespace: &str, name: &str) -> Result<K>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
    C: ResourceClient + ?Sized,
{
    let resource = ApiResource::erase::<K>(&());
    let obj = client.get(&resource, namespace, name).await?;
    decode(obj, describe_target(&resource, namespace, name))
}

/// List typed objects; objects that do not decode are skipped
pub async fn list_typed<K, C>(client: &C, namespace: &str, label_selector: &str) -> Result<Vec<K>>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
    C: ResourceClient + ?Sized,
{
    let resource = ApiResource::erase::<K>(&());
    let objects = client.list(&resource, namespace, label_selector).await?;

    Ok(objects
        .into_iter()
        .filter_map(|obj| {
            let target = describe_target(&resource, namespace, &obj.name_any());
            match decode(obj, target) {
                Ok(k) => Some(k),
                Err(e) => {
                    warn!("Skipping object: {}", e);
                    None
                }
            }
        })
        .collect())
}
