// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use tracing::warn;

use super::{optional, Scope};
use crate::constants::virtual_objects;
use crate::error::{DescribeError, Result};
use crate::kubernetes::client::{get_typed, list_typed, ResourceClient};
use crate::tree::{Node, TreeFragment};
use crate::types::{ClusterResourceSet, ClusterResourceSetBinding};

/// ClusterResourceSets applied to the cluster, collected under one virtual node
pub(crate) async fn discover<C: ResourceClient + ?Sized>(scope: &Scope<'_, C>) -> Result<TreeFragment> {
    let mut fragment = TreeFragment::new();
    if !scope.options.show_cluster_resource_sets {
        return Ok(fragment);
    }

    let cluster_name = scope.cluster_name();
    let bindings: Vec<ClusterResourceSetBinding> = list_typed(scope.client, scope.namespace, "").await?;

    let mut names: Vec<&str> = Vec::new();
    for binding in bindings.iter().filter(|b| b.applies_to(&cluster_name)) {
        for name in binding.resource_set_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let mut resource_sets = Vec::new();
    for name in names {
        match optional(get_typed::<ClusterResourceSet, _>(scope.client, scope.namespace, name).await) {
            Ok(Some(crs)) => resource_sets.push(crs),
            Ok(None) => {}
            Err(e @ DescribeError::Decode { .. }) => warn!("Skipping object: {}", e),
            Err(e) => return Err(e),
        }
    }
    if resource_sets.is_empty() {
        return Ok(fragment);
    }

    let group = Node::virtual_object(
        scope.namespace,
        virtual_objects::RESOURCE_SET_GROUP_KIND,
        virtual_objects::RESOURCE_SET_GROUP_NAME,
    );
    let group_id = group.identity().clone();
    fragment.add(scope.root, group);
    for crs in resource_sets {
        fragment.add(&group_id, Node::from_object(crs));
    }

    Ok(fragment)
}
