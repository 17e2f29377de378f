//! HTTP client for the sequencer gateway (writes) and the feeder gateway
//! (reads), with response classification.
//!
//! Exactly one round trip per call: this layer never retries. Transport
//! failures surface as [`GatewayClientError::Network`]; any response that does
//! not carry the success code fails as
//! [`GatewayClientError::TransactionRejected`] with the raw body kept
//! verbatim, so callers can format diagnostics without re-fetching anything.

mod error;
mod provider;

pub use error::GatewayClientError;
pub use provider::GatewayProvider;
