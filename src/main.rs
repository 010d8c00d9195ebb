// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use capi_describe::config::Config;
use capi_describe::discovery::discover;
use capi_describe::kubernetes::KubeResourceClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, the tree to stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Describing cluster {}/{} with {:?}",
        config.namespace, config.cluster_name, config.options
    );

    // Create Kubernetes client
    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let client = KubeResourceClient::new(client);

    let tree = discover(&client, &config.namespace, &config.cluster_name, &config.options)
        .await
        .with_context(|| format!("Failed to describe cluster {}/{}", config.namespace, config.cluster_name))?;

    let output = serde_yaml::to_string(&tree.summary()).context("Failed to render describe tree")?;
    print!("{}", output);
    Ok(())
}
