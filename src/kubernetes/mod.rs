// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API access for reading Cluster API objects.

pub mod client;

pub use client::{get_typed, list_typed, KubeResourceClient, ResourceClient};
