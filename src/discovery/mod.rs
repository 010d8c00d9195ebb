// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Walks the Cluster API object graph of one Cluster and builds its describe tree.

mod control_plane;
mod resource_sets;
mod workers;

use kube::api::DynamicObject;
use kube::ResourceExt;
use tracing::{debug, info, instrument};

use crate::constants::{labels, meta_names, virtual_objects};
use crate::error::{DescribeError, Result};
use crate::kubernetes::client::{get_typed, list_typed, ResourceClient};
use crate::tree::{Node, NodeIdentity, ObjectTree, TreeFragment};
use crate::types::{Cluster, ContractVersionedObjectReference, Machine};

/// What the describe tree shows beyond the bare topology
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    /// Collapse status-equivalent machines of a MachineDeployment into one node
    pub grouping: bool,
    /// Show the infrastructure machine and bootstrap config of every machine
    pub echo: bool,
    pub show_cluster_resource_sets: bool,
    /// Show the machine templates of control planes, deployments and pools
    pub show_templates: bool,
    /// Wrap control plane and deployment templates in a TemplateGroup node.
    /// Only used together with `show_templates`.
    pub add_template_virtual_node: bool,
}

/// Everything a traversal branch needs to know about the Cluster being described
pub(crate) struct Scope<'a, C: ResourceClient + ?Sized> {
    pub client: &'a C,
    pub cluster: &'a Cluster,
    pub namespace: &'a str,
    pub root: &'a NodeIdentity,
    /// All machines of the cluster, listed once
    pub machines: &'a [Machine],
    pub options: &'a DiscoverOptions,
}

impl<C: ResourceClient + ?Sized> Scope<'_, C> {
    pub fn cluster_name(&self) -> String {
        self.cluster.name_any()
    }

    /// Label selector matching every object of the cluster
    pub fn selector(&self) -> String {
        format!("{}={}", labels::CLUSTER_NAME, self.cluster_name())
    }

    /// Attach a machine under `parent`, plus its infrastructure machine and,
    /// if `with_bootstrap` is set, its bootstrap config when echo is enabled.
    pub async fn add_machine(
        &self,
        fragment: &mut TreeFragment,
        parent: &NodeIdentity,
        machine: &Machine,
        with_bootstrap: bool,
    ) -> Result<()> {
        let machine_id = NodeIdentity::of(machine);
        fragment.add(parent, Node::from_object(machine.clone()));

        if !self.options.echo {
            return Ok(());
        }

        if let Some(infra_ref) = machine.infrastructure_ref() {
            if let Some(infra) = fetch_reference(self.client, self.namespace, infra_ref).await? {
                fragment.add(
                    &machine_id,
                    Node::from_object(infra).with_meta_name(meta_names::MACHINE_INFRASTRUCTURE),
                );
            }
        }

        if with_bootstrap {
            if let Some(config_ref) = machine.bootstrap_config_ref() {
                if let Some(config) = fetch_reference(self.client, self.namespace, config_ref).await? {
                    fragment.add(
                        &machine_id,
                        Node::from_object(config).with_meta_name(meta_names::BOOTSTRAP_CONFIG),
                    );
                }
            }
        }

        Ok(())
    }
}

/// Map a NotFound error to `None`; absent children are left out of the tree
pub(crate) fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DescribeError::NotFound { resource }) => {
            debug!("{} not found, omitting it", resource);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Resolve and fetch the provider object behind a reference
pub(crate) async fn fetch_reference<C: ResourceClient + ?Sized>(
    client: &C,
    namespace: &str,
    reference: &ContractVersionedObjectReference,
) -> Result<Option<DynamicObject>> {
    let Some(resource) = optional(client.resolve(&reference.api_group, &reference.kind).await)? else {
        return Ok(None);
    };
    optional(client.get(&resource, namespace, &reference.name).await)
}

/// Resolve a template reference of `owner` into a node without fetching the
/// template itself. Owners sharing a template each get their own node.
pub(crate) async fn reference_node<C: ResourceClient + ?Sized>(
    client: &C,
    namespace: &str,
    owner: &NodeIdentity,
    reference: &ContractVersionedObjectReference,
    meta_name: &str,
) -> Result<Option<Node>> {
    let resource = optional(client.resolve(&reference.api_group, &reference.kind).await)?;
    Ok(resource.map(|r| {
        Node::from_reference(&r, namespace, &reference.name)
            .scoped_to(owner)
            .with_meta_name(meta_name)
    }))
}

/// The TemplateGroup of `owner`, named after it
pub(crate) fn template_group(owner: &NodeIdentity) -> Node {
    Node::virtual_object(&owner.namespace, virtual_objects::TEMPLATE_GROUP_KIND, &owner.name).scoped_to(owner)
}

/// Build the describe tree of the Cluster `namespace/name`.
///
/// Fails if the Cluster does not exist or if any request to the API server
/// fails; a partial tree is never returned.
#[instrument(skip(client, options))]
pub async fn discover<C: ResourceClient + ?Sized>(
    client: &C,
    namespace: &str,
    name: &str,
    options: &DiscoverOptions,
) -> Result<ObjectTree> {
    let cluster: Cluster = get_typed(client, namespace, name).await?;
    let root = NodeIdentity::of(&cluster);
    let mut tree = ObjectTree::new(Node::from_object(cluster.clone()));

    if let Some(infra_ref) = &cluster.spec.infrastructure_ref {
        if let Some(infra) = fetch_reference(client, namespace, infra_ref).await? {
            tree.add(
                &root,
                Node::from_object(infra).with_meta_name(meta_names::CLUSTER_INFRASTRUCTURE),
            );
        }
    }

    let selector = format!("{}={}", labels::CLUSTER_NAME, name);
    let machines: Vec<Machine> = list_typed(client, namespace, &selector).await?;
    debug!("Found {} machines for cluster {}/{}", machines.len(), namespace, name);

    let scope = Scope {
        client,
        cluster: &cluster,
        namespace,
        root: &root,
        machines: &machines,
        options,
    };

    let (control_plane, workers, resource_sets) = futures::try_join!(
        control_plane::discover(&scope),
        workers::discover(&scope),
        resource_sets::discover(&scope),
    )?;

    tree.merge(control_plane);
    tree.merge(workers);
    tree.merge(resource_sets);

    info!("Built describe tree for cluster {}/{} with {} nodes", namespace, name, tree.len());
    Ok(tree)
}
