//! Wire types for the sequencer gateway (writes) and feeder gateway (reads).
//!
//! These are pure data types: the HTTP round trips live in
//! `oc-gateway-client`, which classifies every response against
//! [`TRANSACTION_RECEIVED`] before handing it to callers.

mod error;
mod response;
mod status;
mod transaction;

pub use error::{StarknetError, StarknetErrorCode};
pub use response::{CallContractResponse, GatewayResponse};
pub use status::{FailureReason, TransactionStatus, TransactionStatusReport};
pub use transaction::{
    DeclareTransaction, DeployTransaction, FunctionCall, InvokeFunctionTransaction, QueryFlag, UserTransaction,
};

/// The only gateway response code accepted as success.
pub const TRANSACTION_RECEIVED: &str = "TRANSACTION_RECEIVED";
