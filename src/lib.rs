// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod conditions;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod kubernetes;
pub mod tree;
pub mod types;

#[cfg(test)]
pub mod test_utils;
