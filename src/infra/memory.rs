//! In-process content store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::repos::{ContentStore, StoreError};

/// Hash store kept in memory, counting every read and write it serves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    hashes: RwLock<HashMap<String, HashMap<String, String>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a hash before the store is shared.
    pub fn with_hash<I, K, V>(mut self, key: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.hashes
            .get_mut()
            .entry(key.to_string())
            .or_default()
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Number of `hash_get_all` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `hash_set` calls served so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let guard = self.hashes.read().await;
        Ok(guard.get(key).cloned().unwrap_or_default())
    }

    async fn hash_set(
        &self,
        key: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.hashes.write().await;
        guard.entry(key.to_string()).or_default().extend(
            fields
                .iter()
                .map(|(field, value)| (field.clone(), value.clone())),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_hash_reads_as_empty() {
        let store = MemoryStore::new();
        let fields = store.hash_get_all("page:home").await.expect("read");
        assert!(fields.is_empty());
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn hash_set_merges_fields() {
        let store = MemoryStore::new().with_hash("page:home", [("title", "Hi"), ("body", "Old")]);

        let update = BTreeMap::from([("body".to_string(), "New".to_string())]);
        store.hash_set("page:home", &update).await.expect("write");

        let fields = store.hash_get_all("page:home").await.expect("read");
        assert_eq!(fields.get("title").map(String::as_str), Some("Hi"));
        assert_eq!(fields.get("body").map(String::as_str), Some("New"));
        assert_eq!(store.writes(), 1);
    }
}
