// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::reference::{ContractVersionedObjectReference, MachineSpecFields, MachineTemplateSpec};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "cluster.x-k8s.io", version = "v1beta2", kind = "Machine")]
#[kube(namespaced)]
#[kube(status = "MachineStatus")]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    #[serde(flatten)]
    pub machine: MachineSpecFields,
}

impl Machine {
    pub fn infrastructure_ref(&self) -> Option<&ContractVersionedObjectReference> {
        self.spec.machine.infrastructure_ref.as_ref()
    }

    /// The bootstrap config reference, `None` when bootstrap data is static
    pub fn bootstrap_config_ref(&self) -> Option<&ContractVersionedObjectReference> {
        self.spec.machine.bootstrap.config_ref.as_ref()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_ref: Option<NodeReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct NodeReference {
    pub name: String,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "cluster.x-k8s.io", version = "v1beta2", kind = "MachineSet")]
#[kube(namespaced)]
#[kube(status = "MachineSetStatus")]
#[serde(rename_all = "camelCase")]
pub struct MachineSetSpec {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineSetStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "cluster.x-k8s.io", version = "v1beta2", kind = "MachineDeployment")]
#[kube(namespaced)]
#[kube(status = "MachineDeploymentStatus")]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentSpec {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default)]
    pub template: MachineTemplateSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "cluster.x-k8s.io", version = "v1beta2", kind = "MachinePool")]
#[kube(namespaced)]
#[kube(status = "MachinePoolStatus")]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolSpec {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default)]
    pub template: MachineTemplateSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

/// Template references shared by MachineDeployments and MachinePools
pub trait MachineTemplateRefs {
    fn template(&self) -> &MachineTemplateSpec;

    fn infrastructure_template_ref(&self) -> Option<&ContractVersionedObjectReference> {
        self.template().spec.infrastructure_ref.as_ref()
    }

    /// `None` when the template uses a static bootstrap data secret
    fn bootstrap_template_ref(&self) -> Option<&ContractVersionedObjectReference> {
        self.template().spec.bootstrap.config_ref.as_ref()
    }
}

impl MachineTemplateRefs for MachineDeployment {
    fn template(&self) -> &MachineTemplateSpec {
        &self.spec.template
    }
}

impl MachineTemplateRefs for MachinePool {
    fn template(&self) -> &MachineTemplateSpec {
        &self.spec.template
    }
}
