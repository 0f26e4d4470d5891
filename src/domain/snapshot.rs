//! Daily running totals.
//!
//! A [`DailySnapshot`] accumulates every processed action whose block
//! timestamp falls in the same UTC day. Totals only grow: deltas are built
//! from non-negative parsed amounts, and the arbitrary-precision totals
//! never clamp.

use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::amount::biguint_string;
use crate::persistence::Entity;

/// Length of one aggregation bucket.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Day index since the Unix epoch for a timestamp in seconds.
#[must_use]
pub const fn day_bucket(timestamp_secs: u64) -> u64 {
    timestamp_secs / SECONDS_PER_DAY
}

/// Storage key of the bucket containing `timestamp_secs`.
#[must_use]
pub fn bucket_key(timestamp_secs: u64) -> String {
    day_bucket(timestamp_secs).to_string()
}

/// One action's contribution to a bucket. The default is the zero delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDelta {
    /// Deposited amount.
    pub deposits: BigUint,
    /// Withdrawn amount.
    pub withdraws: BigUint,
    /// Liquidated collateral value.
    pub liquidate: BigDecimal,
}

impl SnapshotDelta {
    /// Returns `true` if every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.deposits.is_zero() && self.withdraws.is_zero() && self.liquidate.is_zero()
    }

    /// Adds `other` into `self` component-wise.
    pub fn combine(&mut self, other: &Self) {
        self.deposits += &other.deposits;
        self.withdraws += &other.withdraws;
        self.liquidate = &self.liquidate + &other.liquidate;
    }
}

/// Running totals for one day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySnapshot {
    /// Day index rendered as a decimal string.
    pub id: String,
    /// Timestamp of the action that created the bucket (not the start of
    /// the day).
    pub timestamp: u64,
    /// Sum of deposited amounts.
    #[serde(with = "biguint_string")]
    pub total_deposits: BigUint,
    /// Sum of withdrawn amounts.
    #[serde(with = "biguint_string")]
    pub total_withdraws: BigUint,
    /// Sum of liquidated collateral.
    pub total_liquidate: BigDecimal,
}

impl DailySnapshot {
    /// Creates an empty bucket for `timestamp_secs`.
    #[must_use]
    pub fn open(timestamp_secs: u64) -> Self {
        Self {
            id: bucket_key(timestamp_secs),
            timestamp: timestamp_secs,
            total_deposits: BigUint::default(),
            total_withdraws: BigUint::default(),
            total_liquidate: BigDecimal::default(),
        }
    }

    /// Adds a delta to the running totals.
    pub fn apply(&mut self, delta: &SnapshotDelta) {
        self.total_deposits += &delta.deposits;
        self.total_withdraws += &delta.withdraws;
        self.total_liquidate = &self.total_liquidate + &delta.liquidate;
    }
}

impl Entity for DailySnapshot {
    const ENTITY_TYPE: &'static str = "DailySnapshotUpdate";

    fn id(&self) -> &str {
        &self.id
    }
}
