// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;

use crate::discovery::DiscoverOptions;

/// Describe configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace of the Cluster to describe
    pub namespace: String,
    /// Name of the Cluster to describe
    pub cluster_name: String,
    pub options: DiscoverOptions,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cluster_name = lookup("DESCRIBE_CLUSTER")
            .filter(|v| !v.is_empty())
            .context("DESCRIBE_CLUSTER environment variable not set")?;
        let namespace = lookup("DESCRIBE_NAMESPACE").unwrap_or_else(|| "default".to_string());

        let flag = |key: &str, default: bool| -> bool {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        let options = DiscoverOptions {
            grouping: flag("DESCRIBE_GROUPING", true),
            echo: flag("DESCRIBE_ECHO", false),
            show_cluster_resource_sets: flag("DESCRIBE_SHOW_RESOURCE_SETS", false),
            show_templates: flag("DESCRIBE_SHOW_TEMPLATES", false),
            add_template_virtual_node: flag("DESCRIBE_ADD_TEMPLATE_VIRTUAL_NODE", false),
        };

        Ok(Config {
            namespace,
            cluster_name,
            options,
        })
    }
}
