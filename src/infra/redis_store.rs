//! Redis-backed content store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use redis::{AsyncCommands, Client, ErrorKind, RedisError, aio::ConnectionManager};
use tracing::{debug, info};

use crate::application::repos::{ContentStore, StoreError};

/// Content store speaking to Redis through a multiplexed, auto-reconnecting
/// connection.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(|err| StoreError::Connection(err.to_string()))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|err| StoreError::Connection(err.to_string()))?;

        info!(target = "pagecopy::store", "Connected to redis content store");
        Ok(Self { manager })
    }
}

#[async_trait]
impl ContentStore for RedisStore {
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut connection = self.manager.clone();
        let fields: HashMap<String, String> = connection
            .hgetall(key)
            .await
            .map_err(|err| map_redis_error("HGETALL", key, err))?;

        debug!(key, fields = fields.len(), "HGETALL");
        Ok(fields)
    }

    async fn hash_set(
        &self,
        key: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }

        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
            .collect();

        let mut connection = self.manager.clone();
        let () = connection
            .hset_multiple(key, &items)
            .await
            .map_err(|err| map_redis_error("HSET", key, err))?;

        debug!(key, fields = items.len(), "HSET");
        Ok(())
    }
}

fn map_redis_error(command: &'static str, key: &str, err: RedisError) -> StoreError {
    if err.kind() == ErrorKind::TypeError {
        return StoreError::Malformed {
            key: key.to_string(),
            message: err.to_string(),
        };
    }

    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        return StoreError::Connection(err.to_string());
    }

    StoreError::command(command, err)
}
