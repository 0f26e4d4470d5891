//! Indexer error types.
//!
//! [`IndexerError`] is the central error type for the crate. Every variant
//! carries a numeric code so the runtime driving the indexer can tell input
//! problems apart from storage problems when deciding whether to halt.

/// Crate-wide error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category      | Typical cause                          |
/// |-----------|---------------|----------------------------------------|
/// | 1000–1999 | Input         | Unparseable receipt, bad configuration |
/// | 3000–3999 | Server        | Store failure, serialization, I/O      |
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// A delivered receipt could not be understood.
    #[error("invalid receipt: {0}")]
    InvalidReceipt(String),

    /// A configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// A stored entity could not be converted to or from JSON.
    #[error("entity serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading the receipt source failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidReceipt(_) => 1001,
            Self::Config(_) => 1002,
            Self::PersistenceError(_) => 3001,
            Self::Serialization(_) => 3002,
            Self::Io(_) => 3003,
        }
    }

    /// Returns `true` when the error originates from the input rather than
    /// from the indexer's own storage or runtime.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidReceipt(_) | Self::Config(_))
    }
}

impl From<sqlx::Error> for IndexerError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for IndexerError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::PersistenceError(format!("migration failed: {err}"))
    }
}
