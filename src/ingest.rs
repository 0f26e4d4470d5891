//! JSON-lines receipt feed.
//!
//! Reads one [`ReceiptWithOutcome`] per line, in order, and hands each to
//! the [`ReceiptIndexer`] before reading the next. Blank lines are ignored.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::domain::ReceiptWithOutcome;
use crate::error::IndexerError;
use crate::service::ReceiptIndexer;

/// Counters for one feed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Receipts processed without error.
    pub receipts_processed: u64,
    /// Receipts that failed to parse or to persist.
    pub receipts_failed: u64,
    /// Records upserted across all receipts.
    pub records_written: u64,
    /// Receipts whose remaining actions were skipped after an abort.
    pub receipts_aborted: u64,
}

/// Feeds every receipt line from `reader` through `indexer`.
///
/// With `halt_on_error` the first failing receipt ends the run; otherwise
/// the failure is logged and counted and the next line is read. Input
/// errors are logged as warnings, store failures as errors.
///
/// # Errors
///
/// Returns [`IndexerError::Io`] if reading fails, and with
/// `halt_on_error` the first [`IndexerError::InvalidReceipt`] or
/// persistence error.
pub async fn run<R>(
    indexer: &ReceiptIndexer,
    reader: R,
    halt_on_error: bool,
) -> Result<RunStats, IndexerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = RunStats::default();
    let mut lines = reader.lines();
    let mut line_no: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        line_no = line_no.saturating_add(1);
        if line.trim().is_empty() {
            continue;
        }

        match process_line(indexer, &line, line_no).await {
            Ok(summary) => {
                stats.receipts_processed = stats.receipts_processed.saturating_add(1);
                stats.records_written = stats
                    .records_written
                    .saturating_add(u64::try_from(summary.records_written).unwrap_or(u64::MAX));
                if summary.receipt_aborted {
                    stats.receipts_aborted = stats.receipts_aborted.saturating_add(1);
                }
                tracing::debug!(
                    receipt_id = %summary.receipt_id,
                    actions = summary.actions_processed,
                    records = summary.records_written,
                    "receipt processed"
                );
            }
            Err(err) if halt_on_error => {
                tracing::error!(line = line_no, code = err.error_code(), error = %err, "halting");
                return Err(err);
            }
            Err(err) => {
                stats.receipts_failed = stats.receipts_failed.saturating_add(1);
                if err.is_input_error() {
                    tracing::warn!(line = line_no, code = err.error_code(), error = %err, "receipt skipped");
                } else {
                    tracing::error!(
                        line = line_no,
                        code = err.error_code(),
                        error = %err,
                        "receipt failed; writes made before the failure are kept"
                    );
                }
            }
        }
    }

    Ok(stats)
}

async fn process_line(
    indexer: &ReceiptIndexer,
    line: &str,
    line_no: u64,
) -> Result<crate::service::ReceiptSummary, IndexerError> {
    let receipt: ReceiptWithOutcome = serde_json::from_str(line)
        .map_err(|e| IndexerError::InvalidReceipt(format!("line {line_no}: {e}")))?;
    indexer.handle_receipt(&receipt).await
}
