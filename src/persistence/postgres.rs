//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::EntityStore;
use crate::config::IndexerConfig;
use crate::error::IndexerError;

/// PostgreSQL-backed entity store using `sqlx::PgPool`.
///
/// All entity types share the `entities` table, keyed by
/// `(entity_type, id)`, with the document in a JSONB column.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::PersistenceError`] if the database cannot
    /// be reached.
    pub async fn connect(config: &IndexerConfig) -> Result<Self, IndexerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), IndexerError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for PostgresStore {
    async fn load(
        &self,
        entity_type: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, IndexerError> {
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT data FROM entities WHERE entity_type = $1 AND id = $2",
        )
        .bind(entity_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IndexerError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    async fn upsert(
        &self,
        entity_type: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<(), IndexerError> {
        sqlx::query(
            "INSERT INTO entities (entity_type, id, data) VALUES ($1, $2, $3) \
             ON CONFLICT (entity_type, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
        )
        .bind(entity_type)
        .bind(id)
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| IndexerError::PersistenceError(e.to_string()))?;

        Ok(())
    }
}
