//! Daily snapshot accumulation.
//!
//! Load, add, store. The sequence is not atomic: callers must ensure at
//! most one writer per bucket key at a time.

use crate::domain::{DailySnapshot, SnapshotDelta, bucket_key};
use crate::error::IndexerError;
use crate::persistence::{EntityStore, load_entity, save_entity};

/// Adds `delta` to the bucket containing `timestamp_secs`.
///
/// A missing bucket is created with zero totals and `timestamp_secs` as its
/// timestamp. The bucket is written even when `delta` is zero.
///
/// # Errors
///
/// Propagates store and serialization errors.
pub async fn accumulate(
    store: &dyn EntityStore,
    timestamp_secs: u64,
    delta: &SnapshotDelta,
) -> Result<DailySnapshot, IndexerError> {
    let key = bucket_key(timestamp_secs);
    let mut snapshot = match load_entity::<DailySnapshot>(store, &key).await? {
        Some(existing) => existing,
        None => {
            tracing::debug!(bucket = %key, "opening daily snapshot");
            DailySnapshot::open(timestamp_secs)
        }
    };

    snapshot.apply(delta);
    save_entity(store, &snapshot).await?;

    tracing::debug!(
        bucket = %snapshot.id,
        total_deposits = %snapshot.total_deposits,
        total_withdraws = %snapshot.total_withdraws,
        total_liquidate = %snapshot.total_liquidate,
        "snapshot updated"
    );
    Ok(snapshot)
}
