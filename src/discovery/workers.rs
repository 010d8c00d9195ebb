// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use kube::ResourceExt;
use tracing::debug;

use super::{reference_node, template_group, Scope};
use crate::constants::{meta_names, virtual_objects};
use crate::error::Result;
use crate::kubernetes::client::{list_typed, ResourceClient};
use crate::tree::{group_siblings, Grouping, Node, NodeIdentity, TreeFragment};
use crate::types::{is_controlled_by, Machine, MachineDeployment, MachinePool, MachineSet, MachineTemplateRefs};

/// Template reference nodes of a deployment or pool, infrastructure first
async fn template_nodes<C, T>(scope: &Scope<'_, C>, owner_id: &NodeIdentity, owner: &T) -> Result<Vec<Node>>
where
    C: ResourceClient + ?Sized,
    T: MachineTemplateRefs,
{
    let mut nodes = Vec::new();
    if let Some(infra_ref) = owner.infrastructure_template_ref() {
        nodes.extend(
            reference_node(
                scope.client,
                scope.namespace,
                owner_id,
                infra_ref,
                meta_names::MACHINE_INFRASTRUCTURE_TEMPLATE,
            )
            .await?,
        );
    }
    if let Some(bootstrap_ref) = owner.bootstrap_template_ref() {
        nodes.extend(
            reference_node(
                scope.client,
                scope.namespace,
                owner_id,
                bootstrap_ref,
                meta_names::BOOTSTRAP_CONFIG_TEMPLATE,
            )
            .await?,
        );
    }
    Ok(nodes)
}

async fn add_deployment<C: ResourceClient + ?Sized>(
    scope: &Scope<'_, C>,
    fragment: &mut TreeFragment,
    parent: &NodeIdentity,
    deployment: &MachineDeployment,
    machine_sets: &[MachineSet],
) -> Result<()> {
    let md_name = deployment.name_any();
    let md_id = NodeIdentity::of(deployment);
    fragment.add(parent, Node::from_object(deployment.clone()));

    let owned_sets: Vec<String> = machine_sets
        .iter()
        .filter(|ms| is_controlled_by(*ms, "MachineDeployment", &md_name))
        .map(|ms| ms.name_any())
        .collect();
    let machines: Vec<&Machine> = scope
        .machines
        .iter()
        .filter(|m| owned_sets.iter().any(|ms| is_controlled_by(*m, "MachineSet", ms)))
        .collect();

    let Grouping { kept, groups } = if scope.options.grouping {
        group_siblings(
            &md_id,
            machines.iter().map(|m| Node::from_object((*m).clone())).collect(),
        )
    } else {
        Grouping {
            kept: machines.iter().map(|m| Node::from_object((*m).clone())).collect(),
            groups: Vec::new(),
        }
    };

    for node in kept {
        let Some(machine) = machines.iter().find(|m| NodeIdentity::of(**m) == *node.identity()) else {
            continue;
        };
        scope.add_machine(fragment, &md_id, machine, true).await?;
    }

    if scope.options.show_templates {
        let templates = template_nodes(scope, &md_id, deployment).await?;
        if !templates.is_empty() {
            let template_parent = if scope.options.add_template_virtual_node {
                let group = template_group(&md_id);
                let group_id = group.identity().clone();
                fragment.add(&md_id, group);
                group_id
            } else {
                md_id.clone()
            };
            for template in templates {
                fragment.add(&template_parent, template);
            }
        }
    }

    for (group, members) in groups {
        fragment.add_group(&md_id, group, members);
    }

    Ok(())
}

async fn add_pool<C: ResourceClient + ?Sized>(
    scope: &Scope<'_, C>,
    fragment: &mut TreeFragment,
    parent: &NodeIdentity,
    pool: &MachinePool,
) -> Result<()> {
    let mp_name = pool.name_any();
    let mp_id = NodeIdentity::of(pool);
    fragment.add(parent, Node::from_object(pool.clone()));

    if scope.options.show_templates {
        for template in template_nodes(scope, &mp_id, pool).await? {
            fragment.add(&mp_id, template);
        }
    }

    // Bootstrap data of pool machines belongs to the pool, not the machine
    let machines = scope
        .machines
        .iter()
        .filter(|m| is_controlled_by(*m, "MachinePool", &mp_name));
    for machine in machines {
        scope.add_machine(fragment, &mp_id, machine, false).await?;
    }

    Ok(())
}

/// MachineDeployments and MachinePools under a shared Workers node
pub(crate) async fn discover<C: ResourceClient + ?Sized>(scope: &Scope<'_, C>) -> Result<TreeFragment> {
    let mut fragment = TreeFragment::new();
    let selector = scope.selector();

    let (deployments, pools) = futures::try_join!(
        list_typed::<MachineDeployment, _>(scope.client, scope.namespace, &selector),
        list_typed::<MachinePool, _>(scope.client, scope.namespace, &selector),
    )?;
    if deployments.is_empty() && pools.is_empty() {
        debug!("Cluster {} has no workers", scope.cluster_name());
        return Ok(fragment);
    }

    let machine_sets: Vec<MachineSet> = if deployments.is_empty() {
        Vec::new()
    } else {
        list_typed(scope.client, scope.namespace, &selector).await?
    };

    let workers = Node::virtual_object(
        scope.namespace,
        virtual_objects::WORKER_GROUP_KIND,
        virtual_objects::WORKER_GROUP_NAME,
    );
    let workers_id = workers.identity().clone();
    fragment.add(scope.root, workers);

    for deployment in &deployments {
        add_deployment(scope, &mut fragment, &workers_id, deployment, &machine_sets).await?;
    }
    for pool in &pools {
        add_pool(scope, &mut fragment, &workers_id, pool).await?;
    }

    Ok(fragment)
}
