//! Turns a matched event into a stored record and its snapshot delta.

use serde_json::Value;

use crate::domain::amount::{amount_from_value, sum_from_value, value_text};
use crate::domain::log_event::EventData;
use crate::domain::{EventRecord, EventSpec, RecordField, RecordHeader, SnapshotDelta};
use crate::error::IndexerError;
use crate::persistence::{EntityStore, save_entity};

/// A record built from one event, with what it adds to the daily totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// The record as stored.
    pub record: EventRecord,
    /// Contribution to the day's snapshot.
    pub delta: SnapshotDelta,
}

/// Builds the record for `spec` from an event's data fields.
///
/// Header fields are always set. Each mapped key present in `data` is
/// parsed into its record field; absent or malformed values leave the field
/// at its default and add nothing to the delta. Only the primary amount
/// (deposit/withdraw amount, liquidation collateral) feeds the delta.
#[must_use]
pub fn build_record(header: RecordHeader, spec: &EventSpec, data: &EventData) -> RecordedEvent {
    let mut record = EventRecord::empty(spec.kind, header);
    let mut delta = SnapshotDelta::default();

    for mapping in spec.fields {
        let Some(value) = data.get(mapping.source) else {
            continue;
        };
        apply_field(&mut record, &mut delta, mapping.target, mapping.source, value);
    }

    RecordedEvent { record, delta }
}

/// Builds the record for `spec` and upserts it under the receipt id.
///
/// # Errors
///
/// Propagates the store's error; the caller must treat it as fatal for
/// the receipt.
pub async fn record_event(
    store: &dyn EntityStore,
    header: RecordHeader,
    spec: &EventSpec,
    data: &EventData,
) -> Result<RecordedEvent, IndexerError> {
    let recorded = build_record(header, spec, data);
    save_record(store, &recorded.record).await?;

    tracing::info!(
        receipt_id = %recorded.record.id(),
        kind = ?recorded.record.kind(),
        event = spec.event_name,
        "event recorded"
    );
    Ok(recorded)
}

/// Upserts a record of any kind.
///
/// # Errors
///
/// Propagates serialization and store errors.
pub async fn save_record(store: &dyn EntityStore, record: &EventRecord) -> Result<(), IndexerError> {
    match record {
        EventRecord::Deposit(r) => save_entity(store, r).await,
        EventRecord::Withdraw(r) => save_entity(store, r).await,
        EventRecord::Liquidate(r) => save_entity(store, r).await,
    }
}

fn apply_field(
    record: &mut EventRecord,
    delta: &mut SnapshotDelta,
    field: RecordField,
    source: &str,
    value: &Value,
) {
    match field {
        RecordField::AccountId | RecordField::Asset | RecordField::LiquidatedId => {
            let Some(text) = value_text(value) else {
                tracing::warn!(field = source, %value, "unsupported value type; field left empty");
                return;
            };
            set_text(record, field, text.into_owned());
        }
        RecordField::Amount => {
            let Some(amount) = amount_from_value(value) else {
                tracing::warn!(field = source, %value, "malformed amount ignored");
                return;
            };
            match record {
                EventRecord::Deposit(r) => {
                    delta.deposits.clone_from(&amount);
                    r.amount = amount;
                }
                EventRecord::Withdraw(r) => {
                    delta.withdraws.clone_from(&amount);
                    r.amount = amount;
                }
                EventRecord::Liquidate(_) => {}
            }
        }
        RecordField::CollateralSum | RecordField::RepaidSum => {
            let Some(sum) = sum_from_value(value) else {
                tracing::warn!(field = source, %value, "malformed sum ignored");
                return;
            };
            if let EventRecord::Liquidate(r) = record {
                if field == RecordField::CollateralSum {
                    delta.liquidate.clone_from(&sum);
                    r.collateral_sum = Some(sum);
                } else {
                    r.repaid_sum = Some(sum);
                }
            }
        }
    }
}

fn set_text(record: &mut EventRecord, field: RecordField, text: String) {
    match (record, field) {
        (EventRecord::Deposit(r), RecordField::AccountId) => r.account_id = Some(text),
        (EventRecord::Withdraw(r), RecordField::AccountId) => r.account_id = Some(text),
        (EventRecord::Liquidate(r), RecordField::AccountId) => r.account_id = Some(text),
        (EventRecord::Deposit(r), RecordField::Asset) => r.asset = Some(text),
        (EventRecord::Withdraw(r), RecordField::Asset) => r.asset = Some(text),
        (EventRecord::Liquidate(r), RecordField::LiquidatedId) => r.liquidated_id = Some(text),
        _ => {}
    }
}
