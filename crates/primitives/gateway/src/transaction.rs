use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;

/// Version bit marking a transaction as query-only (fee estimation or
/// simulation); the gateway refuses to execute such payloads.
pub const QUERY_VERSION_BASE: Felt = Felt::from_hex_unchecked("0x100000000000000000000000000000000");

/// Read-only execution requested alongside an invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFlag {
    Simulate,
    EstimateFee,
}

/// A transaction as submitted to the gateway's `add_transaction` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UserTransaction {
    #[serde(rename = "INVOKE_FUNCTION")]
    InvokeFunction(InvokeFunctionTransaction),
    #[serde(rename = "DEPLOY")]
    Deploy(DeployTransaction),
    #[serde(rename = "DECLARE")]
    Declare(DeclareTransaction),
}

impl UserTransaction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvokeFunction(_) => "INVOKE_FUNCTION",
            Self::Deploy(_) => "DEPLOY",
            Self::Declare(_) => "DECLARE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeFunctionTransaction {
    pub contract_address: Felt,
    pub entry_point_selector: Felt,
    pub calldata: Vec<Felt>,
    pub signature: Vec<Felt>,
    pub max_fee: Felt,
    pub version: Felt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Felt>,
}

impl InvokeFunctionTransaction {
    /// Switches the payload to its query-only version; the rest is untouched.
    pub fn into_query(mut self, _flag: QueryFlag) -> Self {
        self.version = self.version + QUERY_VERSION_BASE;
        self
    }
}

/// The contract definition travels as the opaque JSON the compiler produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployTransaction {
    pub contract_address_salt: Felt,
    pub constructor_calldata: Vec<Felt>,
    pub contract_definition: serde_json::Value,
    pub version: Felt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclareTransaction {
    pub contract_class: serde_json::Value,
    pub sender_address: Felt,
    pub signature: Vec<Felt>,
    pub nonce: Felt,
    pub max_fee: Felt,
    pub version: Felt,
}

/// Read-only call submitted to the feeder gateway's `call_contract` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub contract_address: Felt,
    pub entry_point_selector: Felt,
    pub calldata: Vec<Felt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signature: Vec<Felt>,
}
