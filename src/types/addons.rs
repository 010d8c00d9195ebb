// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};

use super::condition::Condition;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "addons.cluster.x-k8s.io", version = "v1beta2", kind = "ClusterResourceSet")]
#[kube(namespaced)]
#[kube(status = "ClusterResourceSetStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterResourceSetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResourceSetStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "addons.cluster.x-k8s.io", version = "v1beta2", kind = "ClusterResourceSetBinding")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResourceSetBindingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub bindings: Vec<ResourceSetBinding>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSetBinding {
    pub cluster_resource_set_name: String,
}

impl ClusterResourceSetBinding {
    /// Check if this binding records resource sets applied to the given cluster.
    /// Bindings without an explicit cluster name are named after their cluster.
    pub fn applies_to(&self, cluster_name: &str) -> bool {
        match self.spec.cluster_name.as_deref() {
            Some(name) => name == cluster_name,
            None => self.name_any() == cluster_name,
        }
    }

    pub fn resource_set_names(&self) -> impl Iterator<Item = &str> {
        self.spec
            .bindings
            .iter()
            .map(|b| b.cluster_resource_set_name.as_str())
    }
}
