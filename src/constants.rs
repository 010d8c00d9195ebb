// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Label keys set by Cluster API controllers
pub mod labels {
    /// Name of the Cluster an object belongs to
    pub const CLUSTER_NAME: &str = "cluster.x-k8s.io/cluster-name";
}

/// Cluster API group names
pub mod groups {
    pub const CLUSTER: &str = "cluster.x-k8s.io";
    pub const ADDONS: &str = "addons.cluster.x-k8s.io";
    pub const INFRASTRUCTURE: &str = "infrastructure.cluster.x-k8s.io";
    pub const CONTROL_PLANE: &str = "controlplane.cluster.x-k8s.io";
    pub const BOOTSTRAP: &str = "bootstrap.cluster.x-k8s.io";
}

/// Synthetic objects that only exist inside a describe tree
pub mod virtual_objects {
    pub const API_VERSION: &str = "virtual.cluster.x-k8s.io/v1beta2";

    pub const WORKER_GROUP_KIND: &str = "WorkerGroup";
    pub const WORKER_GROUP_NAME: &str = "Workers";
    pub const TEMPLATE_GROUP_KIND: &str = "TemplateGroup";
    pub const RESOURCE_SET_GROUP_KIND: &str = "ClusterResourceSetGroup";
    pub const RESOURCE_SET_GROUP_NAME: &str = "ClusterResourceSets";

    /// Prefix of grouping node names; sorts after regular object names
    pub const GROUP_NAME_PREFIX: &str = "zzz_";
    /// Number of hex characters of the disambiguation hash
    pub const GROUP_HASH_LEN: usize = 12;
}

/// Role labels attached to tree nodes
pub mod meta_names {
    pub const CONTROL_PLANE: &str = "ControlPlane";
    pub const CLUSTER_INFRASTRUCTURE: &str = "ClusterInfrastructure";
    pub const MACHINE_INFRASTRUCTURE: &str = "MachineInfrastructure";
    pub const BOOTSTRAP_CONFIG: &str = "BootstrapConfig";
    pub const MACHINE_INFRASTRUCTURE_TEMPLATE: &str = "MachineInfrastructureTemplate";
    pub const BOOTSTRAP_CONFIG_TEMPLATE: &str = "BootstrapConfigTemplate";
}

/// Condition types read by the describe tree
pub mod conditions {
    pub const READY: &str = "Ready";
    pub const AVAILABLE: &str = "Available";
    pub const UP_TO_DATE: &str = "UpToDate";
}
