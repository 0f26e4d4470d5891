//! Persistence layer: key-value entity storage.
//!
//! The indexer only ever loads an entity by key or upserts it by key.
//! [`EntityStore`] captures exactly that surface over JSON documents so the
//! runtime can pick a backend at startup; [`Entity`] plus
//! [`load_entity`] / [`save_entity`] give typed access on top of it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::IndexerError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// A typed, keyed document.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Name of the table or collection the entity lives in.
    const ENTITY_TYPE: &'static str;

    /// Storage key of this instance.
    fn id(&self) -> &str;
}

/// Load-by-key / upsert-by-key document store.
#[async_trait]
pub trait EntityStore: Send + Sync + std::fmt::Debug {
    /// Loads the document stored under `(entity_type, id)`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::PersistenceError`] if the store is
    /// unreachable.
    async fn load(
        &self,
        entity_type: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, IndexerError>;

    /// Inserts or replaces the document stored under `(entity_type, id)`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::PersistenceError`] if the write fails.
    async fn upsert(
        &self,
        entity_type: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<(), IndexerError>;
}

/// Loads and deserializes an entity by key.
///
/// # Errors
///
/// Propagates store failures and returns
/// [`IndexerError::Serialization`] if the stored document does not match
/// `E`.
pub async fn load_entity<E: Entity>(
    store: &dyn EntityStore,
    id: &str,
) -> Result<Option<E>, IndexerError> {
    match store.load(E::ENTITY_TYPE, id).await? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

/// Serializes and upserts an entity under its own key.
///
/// # Errors
///
/// Returns [`IndexerError::Serialization`] if `entity` cannot be encoded,
/// or the store's write error.
pub async fn save_entity<E: Entity>(
    store: &dyn EntityStore,
    entity: &E,
) -> Result<(), IndexerError> {
    let data = serde_json::to_value(entity)?;
    store.upsert(E::ENTITY_TYPE, entity.id(), data).await
}
