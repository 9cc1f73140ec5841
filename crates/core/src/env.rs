// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment bindings carried by a message
//!
//! Every binding becomes an environment variable of the entrypoint process,
//! and nothing else does.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors from parsing `KEY=VALUE` bindings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("malformed env: key values must be separated with '=': {0:?}")]
    Malformed(String),
    #[error("malformed env: empty key in {0:?}")]
    EmptyKey(String),
}

/// Environment mapping with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Env(BTreeMap<String, String>);

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding, returning the value it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Parse a `KEY=VALUE` binding and insert it (last write wins)
    pub fn set(&mut self, binding: &str) -> Result<(), EnvError> {
        let (key, value) = parse_binding(binding)?;
        self.0.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// `KEY=VALUE` strings in key order, as consumed by `execve`-style APIs
    pub fn to_environ(&self) -> Vec<String> {
        self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
    }
}

/// Split a binding on its first `=`
///
/// The value may itself contain `=`; the key may not be empty.
pub fn parse_binding(binding: &str) -> Result<(String, String), EnvError> {
    let (key, value) = binding
        .split_once('=')
        .ok_or_else(|| EnvError::Malformed(binding.to_string()))?;
    if key.is_empty() {
        return Err(EnvError::EmptyKey(binding.to_string()));
    }
    Ok((key.to_string(), value.to_string()))
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_environ().join(","))
    }
}

impl From<BTreeMap<String, String>> for Env {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Env {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Env {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
