//! Receipt indexer: the per-receipt entry point.

use std::sync::Arc;

use super::aggregator::accumulate;
use super::recorder::record_event;
use crate::domain::log_event::{LogDecode, MissingEventPolicy, ScanControl, decode_log};
use crate::domain::receipt::FunctionCall;
use crate::domain::{
    Action, ReceiptId, ReceiptWithOutcome, RecordHeader, SnapshotDelta, route,
};
use crate::error::IndexerError;
use crate::persistence::EntityStore;

/// What processing one receipt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    /// Receipt that was processed.
    pub receipt_id: ReceiptId,
    /// Contract-call actions that ran to completion (one snapshot write
    /// each).
    pub actions_processed: usize,
    /// Actions ignored because they are not contract calls.
    pub actions_skipped: usize,
    /// Actions abandoned because a log line lacked its `"event"` field.
    pub actions_aborted: usize,
    /// Records upserted.
    pub records_written: usize,
    /// `true` if the remaining actions were skipped after an abort.
    pub receipt_aborted: bool,
    /// Sum of all snapshot deltas applied.
    pub delta: SnapshotDelta,
}

impl ReceiptSummary {
    fn new(receipt_id: ReceiptId) -> Self {
        Self {
            receipt_id,
            actions_processed: 0,
            actions_skipped: 0,
            actions_aborted: 0,
            records_written: 0,
            receipt_aborted: false,
            delta: SnapshotDelta::default(),
        }
    }
}

/// Result of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ActionOutcome {
    /// Not a contract call; nothing written.
    Skipped,
    /// Logs scanned and the snapshot updated.
    Processed {
        records: usize,
        delta: SnapshotDelta,
    },
    /// Scan abandoned before the snapshot update.
    Aborted(ScanControl),
}

/// Drives receipts through decoding, recording, and aggregation.
///
/// Receipts must be handed over one at a time in block order: snapshot
/// updates are read-modify-write on the store.
#[derive(Debug, Clone)]
pub struct ReceiptIndexer {
    store: Arc<dyn EntityStore>,
    missing_event_policy: MissingEventPolicy,
}

impl ReceiptIndexer {
    /// Creates a new `ReceiptIndexer`.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, missing_event_policy: MissingEventPolicy) -> Self {
        Self {
            store,
            missing_event_policy,
        }
    }

    /// Processes every action of one receipt.
    ///
    /// # Errors
    ///
    /// Returns the first persistence error; actions after it are not
    /// processed and writes made before it are kept.
    pub async fn handle_receipt(
        &self,
        receipt: &ReceiptWithOutcome,
    ) -> Result<ReceiptSummary, IndexerError> {
        let mut summary = ReceiptSummary::new(receipt.receipt.id.clone());
        let block_time = receipt.block.datetime().map(|t| t.to_rfc3339());
        tracing::debug!(
            receipt_id = %summary.receipt_id,
            block_height = receipt.block.height,
            block_time = block_time.as_deref(),
            actions = receipt.receipt.actions.len(),
            "processing receipt"
        );

        for action in &receipt.receipt.actions {
            match self.handle_action(action, receipt).await? {
                ActionOutcome::Skipped => {
                    summary.actions_skipped = summary.actions_skipped.saturating_add(1);
                }
                ActionOutcome::Processed { records, delta } => {
                    summary.actions_processed = summary.actions_processed.saturating_add(1);
                    summary.records_written = summary.records_written.saturating_add(records);
                    summary.delta.combine(&delta);
                }
                ActionOutcome::Aborted(control) => {
                    summary.actions_aborted = summary.actions_aborted.saturating_add(1);
                    if control == ScanControl::AbortReceipt {
                        summary.receipt_aborted = true;
                        break;
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn handle_action(
        &self,
        action: &Action,
        receipt: &ReceiptWithOutcome,
    ) -> Result<ActionOutcome, IndexerError> {
        let receipt_id = &receipt.receipt.id;

        let Some(call) = action.as_function_call() else {
            tracing::info!(%receipt_id, kind = action.kind_str(), "not a function call; skipped");
            return Ok(ActionOutcome::Skipped);
        };

        let timestamp = receipt.block.timestamp_secs();
        let scan = self.scan_logs(call, receipt).await?;

        let (records, delta) = match scan {
            Scan::Finished { records, delta } => (records, delta),
            Scan::Aborted(control) => {
                tracing::warn!(
                    %receipt_id,
                    method = %call.method_name,
                    ?control,
                    "event JSON without \"event\" field; action abandoned"
                );
                return Ok(ActionOutcome::Aborted(control));
            }
        };

        accumulate(self.store.as_ref(), timestamp, &delta).await?;
        Ok(ActionOutcome::Processed { records, delta })
    }

    async fn scan_logs(
        &self,
        call: &FunctionCall,
        receipt: &ReceiptWithOutcome,
    ) -> Result<Scan, IndexerError> {
        let receipt_id = &receipt.receipt.id;
        let mut records = 0usize;
        let mut delta = SnapshotDelta::default();

        let Some(spec) = route(&call.method_name) else {
            tracing::info!(%receipt_id, method = %call.method_name, "method not processed");
            return Ok(Scan::Finished { records, delta });
        };

        for (log_index, line) in receipt.outcome.logs.iter().enumerate() {
            tracing::debug!(%receipt_id, log_index, log = %line, "scanning log");

            let event = match decode_log(line) {
                LogDecode::Event(event) => event,
                LogDecode::NotAnEvent => continue,
                LogDecode::MissingEvent => match self.missing_event_policy.on_missing_event() {
                    ScanControl::Continue => {
                        tracing::warn!(%receipt_id, log_index, "event JSON without \"event\" field; line skipped");
                        continue;
                    }
                    control => return Ok(Scan::Aborted(control)),
                },
            };

            if event.event != spec.event_name {
                continue;
            }
            tracing::debug!(
                %receipt_id,
                log_index,
                event = %event.event,
                standard = event.standard.as_deref(),
                version = event.version.as_deref(),
                "event matched"
            );
            let Some(data) = event.data.as_ref() else {
                tracing::debug!(%receipt_id, log_index, event = %event.event, "event has no data; skipped");
                continue;
            };

            let header = RecordHeader {
                id: receipt_id.clone(),
                timestamp: receipt.block.timestamp_secs(),
                signer_id: receipt.receipt.signer_id.clone(),
                block_height: receipt.block.height,
            };
            let recorded = record_event(self.store.as_ref(), header, spec, data).await?;
            records = records.saturating_add(1);
            delta.combine(&recorded.delta);
        }

        Ok(Scan::Finished { records, delta })
    }
}

/// Result of scanning one action's logs.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scan {
    Finished {
        records: usize,
        delta: SnapshotDelta,
    },
    Aborted(ScanControl),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::receipt::{ActionReceipt, BlockHeader, ExecutionOutcome};
    use crate::domain::{DailySnapshot, Deposit};
    use crate::persistence::{MemoryStore, load_entity};
    use async_trait::async_trait;
    use num_bigint::BigUint;

    const TS_NANOS: u64 = 1_700_000_000 * 1_000_000_000;

    fn call(method: &str) -> Action {
        Action::FunctionCall(FunctionCall {
            method_name: method.to_string(),
            args: String::new(),
            gas: 0,
            deposit: "0".to_string(),
        })
    }

    fn receipt(id: &str, actions: Vec<Action>, logs: &[&str]) -> ReceiptWithOutcome {
        ReceiptWithOutcome {
            receipt: ActionReceipt {
                id: ReceiptId::from(id),
                signer_id: "alice.near".to_string(),
                predecessor_id: "alice.near".to_string(),
                receiver_id: "contract.near".to_string(),
                actions,
            },
            block: BlockHeader {
                height: 100,
                hash: String::new(),
                timestamp_nanosec: TS_NANOS,
            },
            outcome: ExecutionOutcome {
                logs: logs.iter().map(|l| (*l).to_string()).collect(),
            },
        }
    }

    fn indexer(policy: MissingEventPolicy) -> (ReceiptIndexer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let indexer = ReceiptIndexer::new(Arc::<MemoryStore>::clone(&store), policy);
        (indexer, store)
    }

    const DEPOSIT_LOG: &str = r#"EVENT_JSON:{"event":"deposit","data":[{"account_id":"alice.near","token_id":"usdc.near","amount":"10"}]}"#;
    const NO_EVENT_LOG: &str = r#"EVENT_JSON:{"data":[{"amount":"1"}]}"#;

    async fn snapshot(store: &MemoryStore) -> DailySnapshot {
        let Ok(Some(snapshot)) = load_entity::<DailySnapshot>(store, "19675").await else {
            panic!("snapshot should exist");
        };
        snapshot
    }

    #[tokio::test]
    async fn non_call_actions_do_not_touch_snapshot() {
        let (indexer, store) = indexer(MissingEventPolicy::default());
        let r = receipt(
            "r1",
            vec![Action::Transfer {
                deposit: "1".to_string(),
            }],
            &[DEPOSIT_LOG],
        );
        let Ok(summary) = indexer.handle_receipt(&r).await else {
            panic!("handle_receipt failed");
        };
        assert_eq!(summary.actions_skipped, 1);
        assert_eq!(summary.actions_processed, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unrouted_method_writes_zero_snapshot_only() {
        let (indexer, store) = indexer(MissingEventPolicy::default());
        let r = receipt("r1", vec![call("ft_transfer")], &[DEPOSIT_LOG]);
        let Ok(summary) = indexer.handle_receipt(&r).await else {
            panic!("handle_receipt failed");
        };
        assert_eq!(summary.actions_processed, 1);
        assert_eq!(summary.records_written, 0);
        assert!(summary.delta.is_zero());
        assert_eq!(store.count("Deposit").await, 0);
        assert_eq!(snapshot(&store).await.total_deposits, BigUint::default());
    }

    #[tokio::test]
    async fn mismatched_event_name_is_ignored() {
        let (indexer, store) = indexer(MissingEventPolicy::default());
        let r = receipt("r1", vec![call("after_ft_transfer")], &[DEPOSIT_LOG]);
        let Ok(summary) = indexer.handle_receipt(&r).await else {
            panic!("handle_receipt failed");
        };
        assert_eq!(summary.records_written, 0);
        assert_eq!(store.count("Withdraw").await, 0);
        assert_eq!(store.count("Deposit").await, 0);
    }

    #[tokio::test]
    async fn every_matching_line_adds_its_delta() {
        let (indexer, store) = indexer(MissingEventPolicy::default());
        let r = receipt(
            "r1",
            vec![call("ft_on_transfer")],
            &["plain text", DEPOSIT_LOG, DEPOSIT_LOG],
        );
        let Ok(summary) = indexer.handle_receipt(&r).await else {
            panic!("handle_receipt failed");
        };
        assert_eq!(summary.records_written, 2);
        assert_eq!(store.count("Deposit").await, 1);
        assert_eq!(snapshot(&store).await.total_deposits, BigUint::from(20u32));
    }

    #[tokio::test]
    async fn abort_receipt_stops_remaining_actions() {
        let (indexer, store) = indexer(MissingEventPolicy::AbortReceipt);
        let r = receipt(
            "r1",
            vec![call("ft_on_transfer"), call("ft_transfer")],
            &[NO_EVENT_LOG, DEPOSIT_LOG],
        );
        let Ok(summary) = indexer.handle_receipt(&r).await else {
            panic!("handle_receipt failed");
        };
        assert!(summary.receipt_aborted);
        assert_eq!(summary.actions_aborted, 1);
        assert_eq!(summary.actions_processed, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn default_policy_abandons_only_the_current_action() {
        let (indexer, store) = indexer(MissingEventPolicy::default());
        let r = receipt(
            "r1",
            vec![call("ft_on_transfer"), call("ft_transfer")],
            &[NO_EVENT_LOG, DEPOSIT_LOG],
        );
        let Ok(summary) = indexer.handle_receipt(&r).await else {
            panic!("handle_receipt failed");
        };
        assert!(!summary.receipt_aborted);
        assert_eq!(summary.actions_aborted, 1);
        assert_eq!(summary.actions_processed, 1);
        assert_eq!(store.count("Deposit").await, 0);
        assert_eq!(store.count("DailySnapshotUpdate").await, 1);
        assert!(summary.delta.is_zero());
    }

    #[tokio::test]
    async fn abort_action_continues_with_next_action() {
        let (indexer, store) = indexer(MissingEventPolicy::AbortAction);
        let r = receipt(
            "r1",
            vec![call("ft_on_transfer"), call("ft_transfer")],
            &[NO_EVENT_LOG, DEPOSIT_LOG],
        );
        let Ok(summary) = indexer.handle_receipt(&r).await else {
            panic!("handle_receipt failed");
        };
        assert!(!summary.receipt_aborted);
        assert_eq!(summary.actions_aborted, 1);
        assert_eq!(summary.actions_processed, 1);
        assert_eq!(store.count("Deposit").await, 0);
        assert_eq!(snapshot(&store).await.total_deposits, BigUint::default());
    }

    #[tokio::test]
    async fn skip_line_keeps_scanning() {
        let (indexer, store) = indexer(MissingEventPolicy::SkipLine);
        let r = receipt("r1", vec![call("ft_on_transfer")], &[NO_EVENT_LOG, DEPOSIT_LOG]);
        let Ok(summary) = indexer.handle_receipt(&r).await else {
            panic!("handle_receipt failed");
        };
        assert_eq!(summary.records_written, 1);
        let Ok(Some(deposit)) = load_entity::<Deposit>(store.as_ref(), "r1").await else {
            panic!("deposit should exist");
        };
        assert_eq!(deposit.amount, BigUint::from(10u32));
    }

    #[derive(Debug)]
    struct FailingStore;

    #[async_trait]
    impl EntityStore for FailingStore {
        async fn load(
            &self,
            _entity_type: &str,
            _id: &str,
        ) -> Result<Option<serde_json::Value>, IndexerError> {
            Ok(None)
        }

        async fn upsert(
            &self,
            _entity_type: &str,
            _id: &str,
            _data: serde_json::Value,
        ) -> Result<(), IndexerError> {
            Err(IndexerError::PersistenceError("store offline".to_string()))
        }
    }

    #[tokio::test]
    async fn persistence_failure_is_propagated() {
        let indexer = ReceiptIndexer::new(Arc::new(FailingStore), MissingEventPolicy::default());
        let r = receipt("r1", vec![call("ft_on_transfer")], &[DEPOSIT_LOG]);
        let result = indexer.handle_receipt(&r).await;
        assert!(matches!(result, Err(IndexerError::PersistenceError(_))));
    }
}
