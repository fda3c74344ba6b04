//! Repository traits describing persistence adapters.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),
    #[error("store command `{command}` failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },
    #[error("malformed store response for `{key}`: {message}")]
    Malformed { key: String, message: String },
}

impl StoreError {
    pub fn command(command: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Command {
            command,
            message: err.to_string(),
        }
    }
}

/// Hash-map operations of the remote key-value store holding page copy.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every field of the hash at `key`; empty when the key does not exist.
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Set the given fields on the hash at `key`, leaving other fields intact.
    async fn hash_set(&self, key: &str, fields: &BTreeMap<String, String>)
    -> Result<(), StoreError>;
}
