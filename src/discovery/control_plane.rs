// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use kube::api::DynamicObject;
use kube::ResourceExt;
use serde_json::Value;
use tracing::debug;

use super::{fetch_reference, reference_node, template_group, Scope};
use crate::constants::meta_names;
use crate::error::Result;
use crate::kubernetes::client::ResourceClient;
use crate::tree::{Node, TreeFragment};
use crate::types::{is_controlled_by, ContractVersionedObjectReference};

/// Locations of the infrastructure template reference, current contract first
const INFRASTRUCTURE_TEMPLATE_POINTERS: [&str; 2] = [
    "/spec/machineTemplate/spec/infrastructureRef",
    "/spec/machineTemplate/infrastructureRef",
];

/// Read a reference from the untyped control plane body. Older contracts
/// reference by `apiVersion` instead of `apiGroup`.
fn reference_at(data: &Value, pointer: &str) -> Option<ContractVersionedObjectReference> {
    let value = data.pointer(pointer)?;
    let kind = value.get("kind")?.as_str()?;
    let name = value.get("name")?.as_str()?;
    let api_group = match value.get("apiGroup").and_then(Value::as_str) {
        Some(group) => group,
        None => {
            let api_version = value.get("apiVersion")?.as_str()?;
            api_version.split_once('/').map_or("", |(group, _)| group)
        }
    };

    Some(ContractVersionedObjectReference {
        api_group: api_group.to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
    })
}

fn infrastructure_template_ref(control_plane: &DynamicObject) -> Option<ContractVersionedObjectReference> {
    INFRASTRUCTURE_TEMPLATE_POINTERS
        .iter()
        .find_map(|pointer| reference_at(&control_plane.data, pointer))
}

/// The control plane with its machines and, optionally, its machine template
pub(crate) async fn discover<C: ResourceClient + ?Sized>(scope: &Scope<'_, C>) -> Result<TreeFragment> {
    let mut fragment = TreeFragment::new();

    let Some(cp_ref) = &scope.cluster.spec.control_plane_ref else {
        return Ok(fragment);
    };
    let Some(control_plane) = fetch_reference(scope.client, scope.namespace, cp_ref).await? else {
        return Ok(fragment);
    };

    let cp_name = control_plane.name_any();
    let template_ref = infrastructure_template_ref(&control_plane);
    let cp_node = Node::from_object(control_plane).with_meta_name(meta_names::CONTROL_PLANE);
    let cp_id = cp_node.identity().clone();
    fragment.add(scope.root, cp_node);

    let machines = scope
        .machines
        .iter()
        .filter(|m| is_controlled_by(*m, &cp_ref.kind, &cp_name));
    for machine in machines {
        scope.add_machine(&mut fragment, &cp_id, machine, true).await?;
    }

    if !scope.options.show_templates {
        return Ok(fragment);
    }
    let Some(template_ref) = template_ref else {
        debug!("Control plane {} has no infrastructure template", cp_name);
        return Ok(fragment);
    };
    let Some(template) = reference_node(
        scope.client,
        scope.namespace,
        &cp_id,
        &template_ref,
        meta_names::MACHINE_INFRASTRUCTURE_TEMPLATE,
    )
    .await?
    else {
        return Ok(fragment);
    };

    let template_parent = if scope.options.add_template_virtual_node {
        let group = template_group(&cp_id);
        let group_id = group.identity().clone();
        fragment.add(&cp_id, group);
        group_id
    } else {
        cp_id
    };
    fragment.add(&template_parent, template);

    Ok(fragment)
}
