//! In-process entity store.
//!
//! Backs the indexer when persistence is disabled and in tests. Entities
//! live in a `HashMap` behind a [`tokio::sync::RwLock`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::EntityStore;
use crate::error::IndexerError;

type EntityKey = (String, String);

/// Volatile [`EntityStore`] holding JSON documents in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: RwLock<HashMap<EntityKey, serde_json::Value>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities of the given type.
    pub async fn count(&self, entity_type: &str) -> usize {
        self.entities
            .read()
            .await
            .keys()
            .filter(|(kind, _)| kind == entity_type)
            .count()
    }

    /// Total number of stored entities.
    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    /// Returns `true` if nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load(
        &self,
        entity_type: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, IndexerError> {
        let map = self.entities.read().await;
        Ok(map
            .get(&(entity_type.to_string(), id.to_string()))
            .cloned())
    }

    async fn upsert(
        &self,
        entity_type: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<(), IndexerError> {
        let mut map = self.entities.write().await;
        map.insert((entity_type.to_string(), id.to_string()), data);
        Ok(())
    }
}
