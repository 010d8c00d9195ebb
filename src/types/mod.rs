// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster API resource types read by the describe tree.

pub mod addons;
pub mod cluster;
pub mod condition;
pub mod machine;
pub mod reference;

pub use addons::{ClusterResourceSet, ClusterResourceSetBinding};
pub use cluster::Cluster;
pub use condition::{Condition, ConditionStatus};
pub use machine::{Machine, MachineDeployment, MachinePool, MachineSet, MachineTemplateRefs};
pub use reference::ContractVersionedObjectReference;

use kube::ResourceExt;

/// Check if `obj` is controlled by the object with the given kind and name
pub fn is_controlled_by<K: ResourceExt>(obj: &K, kind: &str, name: &str) -> bool {
    obj.owner_references()
        .iter()
        .any(|o| o.controller == Some(true) && o.kind == kind && o.name == name)
}
