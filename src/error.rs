// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Kubernetes API error while fetching {resource}: {source}")]
    Transport {
        resource: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to decode {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DescribeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DescribeError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, DescribeError>;
