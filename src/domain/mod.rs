//! Domain layer: receipt input model, log decoding, routing, and records.
//!
//! Everything here is pure data and pure functions. Storage and the
//! per-receipt control flow live in [`crate::persistence`] and
//! [`crate::service`].

pub mod amount;
pub mod log_event;
pub mod method_route;
pub mod receipt;
pub mod receipt_id;
pub mod records;
pub mod snapshot;

pub use log_event::{DecodedEvent, LogDecode, MissingEventPolicy, ScanControl, decode_log};
pub use method_route::{EventSpec, RecordField, route};
pub use receipt::{Action, ReceiptWithOutcome};
pub use receipt_id::ReceiptId;
pub use records::{Deposit, EventRecord, Liquidate, RecordHeader, RecordKind, Withdraw};
pub use snapshot::{DailySnapshot, SnapshotDelta, bucket_key};
