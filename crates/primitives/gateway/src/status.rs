use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;
use std::fmt;

/// Transaction finality as reported by the feeder gateway.
///
/// Transitions: `NotReceived → Received → Pending → (AcceptedOnL2 →
/// AcceptedOnL1) | Rejected`. The derived ordering follows the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "NOT_RECEIVED")]
    NotReceived,
    #[serde(rename = "RECEIVED")]
    Received,
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "REJECTED")]
    Rejected,
    #[serde(rename = "ACCEPTED_ON_L2")]
    AcceptedOnL2,
    #[serde(rename = "ACCEPTED_ON_L1")]
    AcceptedOnL1,
}

impl TransactionStatus {
    /// A terminal status never transitions again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::AcceptedOnL2 | Self::AcceptedOnL1 | Self::Rejected)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotReceived => "NOT_RECEIVED",
            Self::Received => "RECEIVED",
            Self::Pending => "PENDING",
            Self::Rejected => "REJECTED",
            Self::AcceptedOnL2 => "ACCEPTED_ON_L2",
            Self::AcceptedOnL1 => "ACCEPTED_ON_L1",
        };
        f.write_str(s)
    }
}

/// Feeder gateway response to `get_transaction_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatusReport {
    pub tx_status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<Felt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_failure_reason: Option<FailureReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
