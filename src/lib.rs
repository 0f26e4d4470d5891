//! # lending-indexer
//!
//! Receipt indexer for a lending contract's execution stream.
//!
//! Each delivered receipt is inspected action by action. Contract calls to
//! known methods have their log lines scanned for `EVENT_JSON:` events; a
//! matching event becomes a stored record keyed by the receipt id and adds
//! to the running totals of its UTC day.
//!
//! ## Architecture
//!
//! ```text
//! Receipt feed (ingest/)
//!     │
//!     ├── ReceiptIndexer (service/)
//!     │     ├── route          method → expected event (domain/)
//!     │     ├── decode_log     log line → event (domain/)
//!     │     ├── recorder       event → Deposit / Withdraw / Liquidate
//!     │     └── aggregator     delta → DailySnapshot
//!     │
//!     └── EntityStore (persistence/)
//!           ├── PostgresStore
//!           └── MemoryStore
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod persistence;
pub mod service;
