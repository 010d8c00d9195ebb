// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The describe tree: a parent → ordered children index over [`Node`]s.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use super::node::{Node, NodeIdentity};
use crate::conditions::get_ready;
use crate::types::ConditionStatus;

/// One attach operation recorded by a traversal branch
#[derive(Debug)]
enum FragmentEntry {
    Node { parent: NodeIdentity, node: Node },
    Group { parent: NodeIdentity, group: Node, members: Vec<Node> },
}

/// Ordered attach operations produced by one traversal branch.
///
/// Branches fill fragments independently; only the owner of the
/// [`ObjectTree`] applies them, in a fixed order.
#[derive(Debug, Default)]
pub struct TreeFragment {
    entries: Vec<FragmentEntry>,
}

impl TreeFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, parent: &NodeIdentity, node: Node) {
        self.entries.push(FragmentEntry::Node {
            parent: parent.clone(),
            node,
        });
    }

    pub fn add_group(&mut self, parent: &NodeIdentity, group: Node, members: Vec<Node>) {
        self.entries.push(FragmentEntry::Group {
            parent: parent.clone(),
            group,
            members,
        });
    }
}

/// Serializable nested view of a tree, rooted at one node
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_name: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_grouping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<ConditionStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSummary>,
}

/// Tree of objects built by one discovery call.
///
/// Every edge endpoint is a known node, a node has at most one parent and the
/// root has none.
#[derive(Debug)]
pub struct ObjectTree {
    root: NodeIdentity,
    nodes: HashMap<NodeIdentity, Node>,
    children: HashMap<NodeIdentity, Vec<NodeIdentity>>,
    parents: HashMap<NodeIdentity, NodeIdentity>,
    group_members: HashMap<NodeIdentity, Vec<Node>>,
}

impl ObjectTree {
    pub fn new(root: Node) -> Self {
        let root_id = root.identity().clone();
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);

        Self {
            root: root_id,
            nodes,
            children: HashMap::new(),
            parents: HashMap::new(),
            group_members: HashMap::new(),
        }
    }

    /// Attach `node` under `parent`. Returns false, leaving the tree
    /// untouched, if the parent is unknown or the node is already present.
    pub(crate) fn add(&mut self, parent: &NodeIdentity, node: Node) -> bool {
        if !self.nodes.contains_key(parent) {
            warn!("Cannot attach {}: parent {} is not in the tree", node.identity(), parent);
            return false;
        }
        let id = node.identity().clone();
        if self.nodes.contains_key(&id) {
            warn!("Skipping {}: already attached", id);
            return false;
        }

        self.children.entry(parent.clone()).or_default().push(id.clone());
        self.parents.insert(id.clone(), parent.clone());
        self.nodes.insert(id, node);
        true
    }

    /// Attach a grouping node together with the siblings it collapses
    pub(crate) fn add_group(&mut self, parent: &NodeIdentity, group: Node, members: Vec<Node>) -> bool {
        let id = group.identity().clone();
        if !self.add(parent, group) {
            return false;
        }
        self.group_members.insert(id, members);
        true
    }

    /// Apply the operations of a fragment in the order they were recorded.
    /// Descendants of a rejected node are rejected with it, so they never end
    /// up under a node attached by another fragment.
    pub(crate) fn merge(&mut self, fragment: TreeFragment) {
        let mut rejected: HashSet<NodeIdentity> = HashSet::new();

        for entry in fragment.entries {
            let (parent, id, attached) = match entry {
                FragmentEntry::Node { parent, node } => {
                    let id = node.identity().clone();
                    let attached = !rejected.contains(&parent) && self.add(&parent, node);
                    (parent, id, attached)
                }
                FragmentEntry::Group {
                    parent,
                    group,
                    members,
                } => {
                    let id = group.identity().clone();
                    let attached = !rejected.contains(&parent) && self.add_group(&parent, group, members);
                    (parent, id, attached)
                }
            };
            if !attached {
                debug!("Dropping {} (parent {})", id, parent);
                rejected.insert(id);
            }
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: &NodeIdentity) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Children of `parent` in discovery order, grouping nodes last
    pub fn objects_by_parent(&self, parent: &NodeIdentity) -> Vec<&Node> {
        let Some(children) = self.children.get(parent) else {
            return Vec::new();
        };

        let (groups, mut nodes): (Vec<&Node>, Vec<&Node>) = children
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .partition(|n| n.is_grouping());
        nodes.extend(groups);
        nodes
    }

    pub fn parent_of(&self, id: &NodeIdentity) -> Option<&NodeIdentity> {
        self.parents.get(id)
    }

    /// The siblings collapsed into a grouping node
    pub fn group_members(&self, group: &NodeIdentity) -> &[Node] {
        self.group_members
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn summary(&self) -> NodeSummary {
        self.summarize(self.root())
    }

    fn summarize(&self, node: &Node) -> NodeSummary {
        let mut items: Vec<String> = self
            .group_members(node.identity())
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        items.sort();

        NodeSummary {
            id: node.identity().token(),
            meta_name: node.meta_name().map(str::to_string),
            is_virtual: node.is_virtual(),
            is_grouping: node.is_grouping(),
            ready: node.object().and_then(get_ready).map(|c| c.status),
            items,
            children: self
                .objects_by_parent(node.identity())
                .into_iter()
                .map(|child| self.summarize(child))
                .collect(),
        }
    }
}
