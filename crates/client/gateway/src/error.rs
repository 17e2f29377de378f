#[derive(Debug, thiserror::Error)]
pub enum GatewayClientError {
    /// The gateway or feeder answered with a non-success code. The full raw
    /// body travels in the message so callers can surface it unmodified.
    #[error("Transaction failed because:\n{raw}.")]
    TransactionRejected { raw: String },
    /// Transport failure. A single attempt is made; retrying is the caller's
    /// decision.
    #[error("transport error reaching {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The body parsed as neither the expected payload nor a gateway error.
    #[error("unexpected response from {endpoint}: {source}")]
    UnexpectedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}
