//! Type-safe receipt identifier.
//!
//! [`ReceiptId`] is a newtype wrapper around the opaque receipt hash string
//! so that receipt keys cannot be confused with account ids or bucket keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an execution receipt.
///
/// Assigned by the chain and treated as opaque. Used as the storage key of
/// every event record derived from the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(String);

impl ReceiptId {
    /// Wraps an existing receipt hash.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ReceiptId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ReceiptId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<ReceiptId> for String {
    fn from(id: ReceiptId) -> Self {
        id.0
    }
}
