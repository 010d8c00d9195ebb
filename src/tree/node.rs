// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tree node identities, real and virtual.

use std::fmt;

use kube::api::{ApiResource, DynamicObject};
use kube::{Resource, ResourceExt};
use serde::Serialize;

use crate::conditions::ConditionAccessor;
use crate::constants::virtual_objects;
use crate::types::{Cluster, ClusterResourceSet, Condition, Machine, MachineDeployment, MachinePool};

/// Canonical identity of a tree node.
///
/// The rendered token (`<apiVersion>, Kind=<kind>, <namespace>/<name>`) is
/// both the display value and, through the derived equality, the map key.
/// Nodes shown once per owner carry the owner in `scope`, rendered as a
/// ` [<Kind>/<name>]` suffix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeIdentity {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl NodeIdentity {
    pub fn new(api_version: &str, kind: &str, namespace: &str, name: &str) -> Self {
        NodeIdentity {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            scope: None,
        }
    }

    /// Identity of a typed resource
    pub fn of<K>(obj: &K) -> Self
    where
        K: Resource<DynamicType = ()>,
    {
        NodeIdentity::new(
            &K::api_version(&()),
            &K::kind(&()),
            &obj.namespace().unwrap_or_default(),
            &obj.name_any(),
        )
    }

    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Kind={}, {}/{}",
            self.api_version, self.kind, self.namespace, self.name
        )?;
        if let Some(scope) = &self.scope {
            write!(f, " [{}]", scope)?;
        }
        Ok(())
    }
}

/// The live object behind a real node
#[derive(Clone, Debug)]
pub enum NodeObject {
    Cluster(Box<Cluster>),
    Machine(Box<Machine>),
    MachineDeployment(Box<MachineDeployment>),
    MachinePool(Box<MachinePool>),
    ClusterResourceSet(Box<ClusterResourceSet>),
    Dynamic(Box<DynamicObject>),
}

impl NodeObject {
    pub fn identity(&self) -> NodeIdentity {
        match self {
            NodeObject::Cluster(o) => NodeIdentity::of(&**o),
            NodeObject::Machine(o) => NodeIdentity::of(&**o),
            NodeObject::MachineDeployment(o) => NodeIdentity::of(&**o),
            NodeObject::MachinePool(o) => NodeIdentity::of(&**o),
            NodeObject::ClusterResourceSet(o) => NodeIdentity::of(&**o),
            NodeObject::Dynamic(o) => {
                let (api_version, kind) = o
                    .types
                    .as_ref()
                    .map(|t| (t.api_version.as_str(), t.kind.as_str()))
                    .unwrap_or_default();
                NodeIdentity::new(
                    api_version,
                    kind,
                    &o.namespace().unwrap_or_default(),
                    &o.name_any(),
                )
            }
        }
    }

    fn accessor(&self) -> &dyn ConditionAccessor {
        match self {
            NodeObject::Cluster(o) => &**o,
            NodeObject::Machine(o) => &**o,
            NodeObject::MachineDeployment(o) => &**o,
            NodeObject::MachinePool(o) => &**o,
            NodeObject::ClusterResourceSet(o) => &**o,
            NodeObject::Dynamic(o) => &**o,
        }
    }

    fn accessor_mut(&mut self) -> &mut dyn ConditionAccessor {
        match self {
            NodeObject::Cluster(o) => &mut **o,
            NodeObject::Machine(o) => &mut **o,
            NodeObject::MachineDeployment(o) => &mut **o,
            NodeObject::MachinePool(o) => &mut **o,
            NodeObject::ClusterResourceSet(o) => &mut **o,
            NodeObject::Dynamic(o) => &mut **o,
        }
    }
}

impl ConditionAccessor for NodeObject {
    fn conditions(&self) -> Option<Vec<Condition>> {
        self.accessor().conditions()
    }

    fn set_conditions(&mut self, conditions: Vec<Condition>) {
        self.accessor_mut().set_conditions(conditions)
    }

    fn is_machine(&self) -> bool {
        self.accessor().is_machine()
    }
}

macro_rules! node_object_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for NodeObject {
                fn from(obj: $variant) -> Self {
                    NodeObject::$variant(Box::new(obj))
                }
            }
        )*
    };
}

node_object_from!(Cluster, Machine, MachineDeployment, MachinePool, ClusterResourceSet);

impl From<DynamicObject> for NodeObject {
    fn from(obj: DynamicObject) -> Self {
        NodeObject::Dynamic(Box::new(obj))
    }
}

/// A node of the describe tree
#[derive(Clone, Debug)]
pub struct Node {
    identity: NodeIdentity,
    virtual_object: bool,
    grouping_object: bool,
    meta_name: Option<String>,
    object: Option<NodeObject>,
}

impl Node {
    /// Mint a virtual node. Identical arguments denote the same node.
    pub fn virtual_object(namespace: &str, kind: &str, name: &str) -> Self {
        Node {
            identity: NodeIdentity::new(virtual_objects::API_VERSION, kind, namespace, name),
            virtual_object: true,
            grouping_object: false,
            meta_name: None,
            object: None,
        }
    }

    /// Mint a virtual node standing for a collapsed set of siblings
    pub(crate) fn grouping_object(namespace: &str, kind: &str, name: &str) -> Self {
        Node {
            grouping_object: true,
            ..Node::virtual_object(namespace, kind, name)
        }
    }

    /// A real node for an object known only by reference; its body is not fetched
    pub fn from_reference(resource: &ApiResource, namespace: &str, name: &str) -> Self {
        Node {
            identity: NodeIdentity::new(&resource.api_version, &resource.kind, namespace, name),
            virtual_object: false,
            grouping_object: false,
            meta_name: None,
            object: None,
        }
    }

    pub fn from_object(object: impl Into<NodeObject>) -> Self {
        let object = object.into();
        Node {
            identity: object.identity(),
            virtual_object: false,
            grouping_object: false,
            meta_name: None,
            object: Some(object),
        }
    }

    /// Attach a role label used to tell apart objects of provider-specific kinds
    pub fn with_meta_name(mut self, meta_name: &str) -> Self {
        self.meta_name = Some(meta_name.to_string());
        self
    }

    /// Key this node to `owner`, so one referenced object can be shown under
    /// several owners without the identities colliding.
    pub fn scoped_to(mut self, owner: &NodeIdentity) -> Self {
        self.identity.scope = Some(format!("{}/{}", owner.kind, owner.name));
        self
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn kind(&self) -> &str {
        &self.identity.kind
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn is_virtual(&self) -> bool {
        self.virtual_object
    }

    pub fn is_grouping(&self) -> bool {
        self.grouping_object
    }

    pub fn meta_name(&self) -> Option<&str> {
        self.meta_name.as_deref()
    }

    pub fn object(&self) -> Option<&NodeObject> {
        self.object.as_ref()
    }
}
