//! Service layer: per-receipt orchestration.
//!
//! [`ReceiptIndexer`] routes each contract call, scans its logs, records
//! matching events, and updates the daily snapshot.

pub mod aggregator;
pub mod indexer;
pub mod recorder;

pub use indexer::{ReceiptIndexer, ReceiptSummary};
