//! Durable event records.
//!
//! One record is stored per qualifying receipt, keyed by the receipt id.
//! Field names are serialized in camelCase so stored entities keep the
//! column names downstream consumers already query.

use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::ReceiptId;
use super::amount::biguint_string;
use crate::persistence::Entity;

/// Record type produced by a routed method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Token deposited into the protocol.
    Deposit,
    /// Token withdrawn from the protocol.
    Withdraw,
    /// Account liquidated.
    Liquidate,
}

impl RecordKind {
    /// Returns the stored entity type name.
    #[must_use]
    pub const fn entity_type(self) -> &'static str {
        match self {
            Self::Deposit => Deposit::ENTITY_TYPE,
            Self::Withdraw => Withdraw::ENTITY_TYPE,
            Self::Liquidate => Liquidate::ENTITY_TYPE,
        }
    }
}

/// Fields every record carries regardless of kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    /// Receipt the record was extracted from.
    pub id: ReceiptId,
    /// Block timestamp in seconds.
    pub timestamp: u64,
    /// Signer of the originating transaction.
    pub signer_id: String,
    /// Height of the block that executed the receipt.
    pub block_height: u64,
}

/// A deposit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// Receipt id.
    pub id: ReceiptId,
    /// Block timestamp in seconds.
    pub timestamp: u64,
    /// Transaction signer.
    pub signer_id: String,
    /// Block height.
    pub block_height: u64,
    /// Account credited by the contract.
    pub account_id: Option<String>,
    /// Deposited amount in the token's smallest unit.
    #[serde(with = "biguint_string")]
    pub amount: BigUint,
    /// Token contract id.
    pub asset: Option<String>,
}

/// A successful withdrawal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdraw {
    /// Receipt id.
    pub id: ReceiptId,
    /// Block timestamp in seconds.
    pub timestamp: u64,
    /// Transaction signer.
    pub signer_id: String,
    /// Block height.
    pub block_height: u64,
    /// Account debited by the contract.
    pub account_id: Option<String>,
    /// Withdrawn amount in the token's smallest unit.
    #[serde(with = "biguint_string")]
    pub amount: BigUint,
    /// Token contract id.
    pub asset: Option<String>,
}

/// A liquidation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liquidate {
    /// Receipt id.
    pub id: ReceiptId,
    /// Block timestamp in seconds.
    pub timestamp: u64,
    /// Transaction signer.
    pub signer_id: String,
    /// Block height.
    pub block_height: u64,
    /// Liquidator account.
    pub account_id: Option<String>,
    /// Account being liquidated.
    pub liquidated_id: Option<String>,
    /// Value of collateral taken.
    pub collateral_sum: Option<BigDecimal>,
    /// Value of debt repaid.
    pub repaid_sum: Option<BigDecimal>,
}

impl Entity for Deposit {
    const ENTITY_TYPE: &'static str = "Deposit";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Entity for Withdraw {
    const ENTITY_TYPE: &'static str = "Withdraw";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Entity for Liquidate {
    const ENTITY_TYPE: &'static str = "Liquidate";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Any of the three record kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    /// Deposit record.
    Deposit(Deposit),
    /// Withdraw record.
    Withdraw(Withdraw),
    /// Liquidate record.
    Liquidate(Liquidate),
}

impl EventRecord {
    /// Creates a record of `kind` with every event field at its default.
    #[must_use]
    pub fn empty(kind: RecordKind, header: RecordHeader) -> Self {
        let RecordHeader {
            id,
            timestamp,
            signer_id,
            block_height,
        } = header;
        match kind {
            RecordKind::Deposit => Self::Deposit(Deposit {
                id,
                timestamp,
                signer_id,
                block_height,
                account_id: None,
                amount: BigUint::default(),
                asset: None,
            }),
            RecordKind::Withdraw => Self::Withdraw(Withdraw {
                id,
                timestamp,
                signer_id,
                block_height,
                account_id: None,
                amount: BigUint::default(),
                asset: None,
            }),
            RecordKind::Liquidate => Self::Liquidate(Liquidate {
                id,
                timestamp,
                signer_id,
                block_height,
                account_id: None,
                liquidated_id: None,
                collateral_sum: None,
                repaid_sum: None,
            }),
        }
    }

    /// Returns the kind of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Deposit(_) => RecordKind::Deposit,
            Self::Withdraw(_) => RecordKind::Withdraw,
            Self::Liquidate(_) => RecordKind::Liquidate,
        }
    }

    /// Returns the receipt id the record is keyed by.
    #[must_use]
    pub fn id(&self) -> &ReceiptId {
        match self {
            Self::Deposit(r) => &r.id,
            Self::Withdraw(r) => &r.id,
            Self::Liquidate(r) => &r.id,
        }
    }
}
