//! Structured events embedded in contract log lines.
//!
//! Contracts emit application events as free-text log lines of the form
//! `EVENT_JSON:{"event": "<name>", "data": [{...}]}`. [`decode_log`] turns
//! one such line into a [`DecodedEvent`]. It never fails: logs come from
//! untrusted contracts and malformed lines are routine.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::IndexerError;

/// Marker prefix flagging a log line as a structured event.
pub const EVENT_JSON_PREFIX: &str = "EVENT_JSON:";

/// Field map of the first `data` element.
pub type EventData = Map<String, Value>;

/// An event decoded from a single log line.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    /// Value of the top-level `"event"` field.
    pub event: String,
    /// Optional event standard name (e.g. `"burrow"`).
    pub standard: Option<String>,
    /// Optional event standard version.
    pub version: Option<String>,
    /// First element of `"data"`, when it is an object.
    pub data: Option<EventData>,
}

/// Result of decoding one log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LogDecode {
    /// The line carried an event.
    Event(DecodedEvent),
    /// The line is a JSON object without an `"event"` field.
    MissingEvent,
    /// The line is not a structured event at all.
    NotAnEvent,
}

/// Decodes one raw log line.
///
/// The `EVENT_JSON:` marker is stripped when present; a line without it is
/// still parsed as a whole. `"data"` may be an array (only the first
/// element is kept) or a single object.
#[must_use]
pub fn decode_log(line: &str) -> LogDecode {
    let payload = line.strip_prefix(EVENT_JSON_PREFIX).unwrap_or(line);

    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(payload.trim()) else {
        return LogDecode::NotAnEvent;
    };

    let event = match object.remove("event") {
        None | Some(Value::Null) => return LogDecode::MissingEvent,
        Some(Value::String(name)) => name,
        Some(_) => return LogDecode::NotAnEvent,
    };

    let data = match object.remove("data") {
        Some(Value::Array(items)) => items.into_iter().next().and_then(into_object),
        Some(Value::Object(map)) => Some(map),
        _ => None,
    };

    LogDecode::Event(DecodedEvent {
        event,
        standard: string_field(&object, "standard"),
        version: string_field(&object, "version"),
        data,
    })
}

fn into_object(value: Value) -> Option<EventData> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

/// What to do when a log line decodes to a JSON object without `"event"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingEventPolicy {
    /// Stop the current action without a snapshot update and skip the
    /// receipt's remaining actions.
    AbortReceipt,
    /// Stop the current action without a snapshot update; later actions
    /// still run.
    #[default]
    AbortAction,
    /// Ignore the line and keep scanning.
    SkipLine,
}

/// Control decision for the log scan of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    /// Move on to the next log line.
    Continue,
    /// Abandon this action only.
    AbortAction,
    /// Abandon this action and every remaining action of the receipt.
    AbortReceipt,
}

impl MissingEventPolicy {
    /// Returns the scan decision for a line missing its `"event"` field.
    #[must_use]
    pub const fn on_missing_event(self) -> ScanControl {
        match self {
            Self::AbortReceipt => ScanControl::AbortReceipt,
            Self::AbortAction => ScanControl::AbortAction,
            Self::SkipLine => ScanControl::Continue,
        }
    }

    /// Configuration string for this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AbortReceipt => "abort_receipt",
            Self::AbortAction => "abort_action",
            Self::SkipLine => "skip_line",
        }
    }
}

impl FromStr for MissingEventPolicy {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort_receipt" => Ok(Self::AbortReceipt),
            "abort_action" => Ok(Self::AbortAction),
            "skip_line" => Ok(Self::SkipLine),
            other => Err(IndexerError::Config(format!(
                "unknown missing-event policy: {other}"
            ))),
        }
    }
}
