use crate::TRANSACTION_RECEIVED;
use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;

/// Parsed gateway response to `add_transaction`.
///
/// Only [`TRANSACTION_RECEIVED`] counts as success; the client layer refuses
/// to hand out anything else (the raw body travels in the rejection error
/// instead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<Felt>,
    /// Contract address, present on DEPLOY responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Felt>,
    /// Class hash, present on DECLARE responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_hash: Option<Felt>,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        self.code == TRANSACTION_RECEIVED
    }
}

/// Feeder gateway response to `call_contract`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallContractResponse {
    pub result: Vec<Felt>,
}
