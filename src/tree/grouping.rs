// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Collapsing of status-equivalent siblings into grouping nodes.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::node::{Node, NodeIdentity};
use crate::conditions::{get_available, get_machine_up_to_date, get_ready};
use crate::constants::virtual_objects::{GROUP_HASH_LEN, GROUP_NAME_PREFIX};
use crate::types::{Condition, ConditionStatus};

/// Result of grouping one sibling set
#[derive(Debug, Default)]
pub struct Grouping {
    /// Siblings left as individual nodes, in their original order
    pub kept: Vec<Node>,
    /// Grouping nodes with the siblings each of them collapses
    pub groups: Vec<(Node, Vec<Node>)>,
}

type ConditionSignature = Option<(ConditionStatus, Option<String>)>;

/// Siblings with equal keys are shown as one node. Names never take part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EquivalenceKey {
    kind: String,
    ready: ConditionSignature,
    available: ConditionSignature,
    up_to_date: ConditionSignature,
}

fn signature(condition: Option<Condition>) -> ConditionSignature {
    condition.map(|c| (c.status, c.reason))
}

/// Virtual and reference-only siblings carry no status and are never grouped
fn equivalence_key(node: &Node) -> Option<EquivalenceKey> {
    if node.is_virtual() {
        return None;
    }
    let object = node.object()?;
    Some(EquivalenceKey {
        kind: node.kind().to_string(),
        ready: signature(get_ready(object)),
        available: signature(get_available(object)),
        up_to_date: signature(get_machine_up_to_date(object)),
    })
}

/// Deterministic name of a grouping node.
///
/// Derived from the parent and the collapsed members so that groups under
/// different parents never collide and repeated runs give the same name.
fn group_name(parent: &NodeIdentity, members: &[Node]) -> String {
    let mut tokens: Vec<String> = members.iter().map(|m| m.identity().token()).collect();
    tokens.sort();

    let mut hasher = Sha256::new();
    hasher.update(parent.token().as_bytes());
    for token in &tokens {
        hasher.update(b"\n");
        hasher.update(token.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());

    format!("{}{}", GROUP_NAME_PREFIX, &digest[..GROUP_HASH_LEN])
}

/// Collapse every set of two or more status-equivalent siblings of `parent`
/// into one grouping node.
pub fn group_siblings(parent: &NodeIdentity, siblings: Vec<Node>) -> Grouping {
    let mut partitions: Vec<Vec<Node>> = Vec::new();
    let mut index: HashMap<EquivalenceKey, usize> = HashMap::new();

    for node in siblings {
        match equivalence_key(&node) {
            Some(key) => {
                let i = *index.entry(key).or_insert_with(|| {
                    partitions.push(Vec::new());
                    partitions.len() - 1
                });
                partitions[i].push(node);
            }
            None => partitions.push(vec![node]),
        }
    }

    let mut grouping = Grouping::default();
    for members in partitions {
        if members.len() < 2 {
            grouping.kept.extend(members);
            continue;
        }

        let kind = format!("{}Group", members[0].kind());
        let name = group_name(parent, &members);
        debug!("Grouping {} {} objects under {} as {}", members.len(), members[0].kind(), parent, name);

        let group = Node::grouping_object(&parent.namespace, &kind, &name);
        grouping.groups.push((group, members));
    }

    grouping
}
