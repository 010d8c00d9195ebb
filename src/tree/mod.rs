// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Object tree model: node identities, the tree itself and sibling grouping.

pub mod grouping;
pub mod node;
pub mod object_tree;

pub use grouping::{group_siblings, Grouping};
pub use node::{Node, NodeIdentity, NodeObject};
pub use object_tree::{NodeSummary, ObjectTree, TreeFragment};
