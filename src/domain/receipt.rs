//! Receipt input model.
//!
//! Mirrors the receipt-with-outcome shape delivered by the indexing runtime:
//! the action receipt itself, the header of the block that executed it, and
//! the execution outcome with its log lines. The indexer only reads these
//! types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReceiptId;

/// Nanoseconds per second, for block timestamp conversion.
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// One receipt together with its block and execution outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptWithOutcome {
    /// The action receipt.
    pub receipt: ActionReceipt,
    /// Header of the block the receipt executed in.
    pub block: BlockHeader,
    /// Execution outcome, including emitted logs.
    pub outcome: ExecutionOutcome,
}

/// Action receipt: who signed it and what it does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReceipt {
    /// Receipt hash.
    pub id: ReceiptId,
    /// Account that signed the originating transaction.
    pub signer_id: String,
    /// Account that produced this receipt.
    #[serde(default)]
    pub predecessor_id: String,
    /// Contract account that executes the receipt.
    #[serde(default)]
    pub receiver_id: String,
    /// Ordered list of actions.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A single action within a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Contract method invocation.
    FunctionCall(FunctionCall),
    /// Native token transfer.
    Transfer {
        /// Attached amount in the smallest native unit, string encoded.
        #[serde(default)]
        deposit: String,
    },
    /// Account creation.
    CreateAccount,
    /// Contract deployment.
    DeployContract,
    /// Any other action kind; carries nothing the indexer uses.
    #[serde(other)]
    Other,
}

impl Action {
    /// Returns the function call payload when this is a contract call.
    #[must_use]
    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            Self::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    /// Short name of the action kind for tracing.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::FunctionCall(_) => "function_call",
            Self::Transfer { .. } => "transfer",
            Self::CreateAccount => "create_account",
            Self::DeployContract => "deploy_contract",
            Self::Other => "other",
        }
    }
}

/// Contract call action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Invoked method name.
    pub method_name: String,
    /// Base64-encoded call arguments.
    #[serde(default)]
    pub args: String,
    /// Prepaid gas.
    #[serde(default)]
    pub gas: u64,
    /// Attached deposit, string encoded.
    #[serde(default)]
    pub deposit: String,
}

/// Block header subset used by the indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block height.
    pub height: u64,
    /// Block hash.
    #[serde(default)]
    pub hash: String,
    /// Block timestamp in nanoseconds since the Unix epoch.
    pub timestamp_nanosec: u64,
}

impl BlockHeader {
    /// Block timestamp truncated to whole seconds.
    #[must_use]
    pub const fn timestamp_secs(&self) -> u64 {
        self.timestamp_nanosec / NANOS_PER_SECOND
    }

    /// Block timestamp as a UTC datetime, when representable.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let nanos = i64::try_from(self.timestamp_nanosec).ok()?;
        Some(DateTime::from_timestamp_nanos(nanos))
    }
}

/// Execution outcome subset used by the indexer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Log lines in emission order.
    #[serde(default)]
    pub logs: Vec<String>,
}
