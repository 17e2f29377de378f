use crate::error::GatewayClientError;
use op_chain_config::NetworkConfig;
use op_gateway::{
    CallContractResponse, FunctionCall, GatewayResponse, QueryFlag, StarknetError, TransactionStatusReport,
    UserTransaction, TRANSACTION_RECEIVED,
};
use op_utils::parsers::url_join_segment;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use starknet_types_core::felt::Felt;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for one network's gateway and feeder-gateway endpoints.
#[derive(Debug, Clone)]
pub struct GatewayProvider {
    client: reqwest::Client,
    headers: HeaderMap,
    gateway_url: Url,
    feeder_gateway_url: Url,
}

impl GatewayProvider {
    pub fn new(gateway_url: Url, feeder_gateway_url: Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build the http client from a static configuration. This should not fail in prod.");
        Self { client, headers: HeaderMap::new(), gateway_url, feeder_gateway_url }
    }

    pub fn from_network(config: &NetworkConfig) -> Self {
        Self::new(config.gateway_url.clone(), config.feeder_gateway_url.clone())
    }

    /// Appends the /gateway and /feeder_gateway suffixes to a single base url.
    pub fn new_from_base_path(base_path: Url) -> Self {
        let (mut gateway_url, mut feeder_gateway_url) = (base_path.clone(), base_path);
        url_join_segment(&mut gateway_url, "gateway");
        url_join_segment(&mut feeder_gateway_url, "feeder_gateway");
        Self::new(gateway_url, feeder_gateway_url)
    }

    pub fn starknet_alpha_mainnet() -> Self {
        Self::from_network(&NetworkConfig::starknet_alpha_mainnet())
    }

    pub fn starknet_alpha_sepolia() -> Self {
        Self::from_network(&NetworkConfig::starknet_alpha_sepolia())
    }

    pub fn starknet_integration_sepolia() -> Self {
        Self::from_network(&NetworkConfig::starknet_integration_sepolia())
    }

    /// Attaches a header (api keys, throttling bypass) to every request.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn remove_header(&mut self, name: HeaderName) -> Option<HeaderValue> {
        self.headers.remove(name)
    }

    /// Submits a signed transaction to the gateway. One round trip; the
    /// optional `token` rides along as a query parameter (mainnet declares).
    pub async fn add_transaction(
        &self,
        tx: &UserTransaction,
        token: Option<&str>,
    ) -> Result<GatewayResponse, GatewayClientError> {
        let mut url = self.gateway_url.clone();
        url_join_segment(&mut url, "add_transaction");
        if let Some(token) = token {
            url.query_pairs_mut().append_pair("token", token);
        }
        let body = self.post(url, tx).await?;
        parse_body("add_transaction", &body)
    }

    /// Read-only call through the feeder gateway; returns the `result` felts.
    pub async fn call_contract(&self, call: &FunctionCall) -> Result<Vec<Felt>, GatewayClientError> {
        let mut url = self.feeder_gateway_url.clone();
        url_join_segment(&mut url, "call_contract");
        url.query_pairs_mut().append_pair("blockNumber", "pending");
        let body = self.post(url, call).await?;
        parse_body::<CallContractResponse>("call_contract", &body).map(|response| response.result)
    }

    /// Fee estimation / simulation for a query-version transaction. The
    /// response shape depends on the sequencer, so it stays opaque JSON.
    pub async fn query_transaction(
        &self,
        tx: &UserTransaction,
        flag: QueryFlag,
    ) -> Result<serde_json::Value, GatewayClientError> {
        let endpoint = match flag {
            QueryFlag::EstimateFee => "estimate_fee",
            QueryFlag::Simulate => "simulate_transaction",
        };
        let mut url = self.feeder_gateway_url.clone();
        url_join_segment(&mut url, endpoint);
        url.query_pairs_mut().append_pair("blockNumber", "pending");
        let body = self.post(url, tx).await?;
        parse_body(endpoint, &body)
    }

    /// Current nonce of `contract_address`, as reported by the feeder.
    pub async fn get_nonce(&self, contract_address: Felt) -> Result<Felt, GatewayClientError> {
        let mut url = self.feeder_gateway_url.clone();
        url_join_segment(&mut url, "get_nonce");
        url.query_pairs_mut().append_pair("contractAddress", &format!("{contract_address:#x}"));
        let body = self.get(url).await?;
        parse_body("get_nonce", &body)
    }

    /// Finality of `transaction_hash`, as reported by the feeder.
    pub async fn get_transaction_status(
        &self,
        transaction_hash: Felt,
    ) -> Result<TransactionStatusReport, GatewayClientError> {
        let mut url = self.feeder_gateway_url.clone();
        url_join_segment(&mut url, "get_transaction_status");
        url.query_pairs_mut().append_pair("transactionHash", &format!("{transaction_hash:#x}"));
        let body = self.get(url).await?;
        parse_body("get_transaction_status", &body)
    }

    async fn post<T: Serialize>(&self, url: Url, payload: &T) -> Result<String, GatewayClientError> {
        let endpoint = url.to_string();
        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .json(payload)
            .send()
            .await
            .map_err(|source| GatewayClientError::Network { endpoint: endpoint.clone(), source })?;
        classify(&endpoint, response).await
    }

    async fn get(&self, url: Url) -> Result<String, GatewayClientError> {
        let endpoint = url.to_string();
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|source| GatewayClientError::Network { endpoint: endpoint.clone(), source })?;
        classify(&endpoint, response).await
    }
}

/// Splits responses into success and rejection. A body carrying a `code`
/// other than [`TRANSACTION_RECEIVED`] is a rejection regardless of the HTTP
/// status; a non-2xx response without a readable code is one as well.
async fn classify(endpoint: &str, response: reqwest::Response) -> Result<String, GatewayClientError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| GatewayClientError::Network { endpoint: endpoint.to_string(), source })?;

    let code = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("code").and_then(|code| code.as_str()).map(str::to_owned));
    let rejected = match &code {
        Some(code) => code != TRANSACTION_RECEIVED,
        None => !status.is_success(),
    };

    if rejected {
        if let Ok(error) = serde_json::from_str::<StarknetError>(&body) {
            tracing::debug!(target: "gateway", "{endpoint} rejected the request: {:?}", error.code);
        }
        return Err(GatewayClientError::TransactionRejected { raw: body.trim().to_string() });
    }
    Ok(body)
}

fn parse_body<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, GatewayClientError> {
    serde_json::from_str(body)
        .map_err(|source| GatewayClientError::UnexpectedResponse { endpoint: endpoint.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use httpmock::prelude::*;
    use op_gateway::{InvokeFunctionTransaction, TransactionStatus};
    use serde_json::json;

    fn provider(server: &MockServer) -> GatewayProvider {
        GatewayProvider::new_from_base_path(server.base_url().parse().unwrap())
    }

    fn invoke_tx() -> UserTransaction {
        UserTransaction::InvokeFunction(InvokeFunctionTransaction {
            contract_address: Felt::from_hex_unchecked("0x123"),
            entry_point_selector: Felt::from_hex_unchecked("0x456"),
            calldata: vec![Felt::ONE],
            signature: vec![],
            max_fee: Felt::ZERO,
            version: Felt::ONE,
            nonce: Some(Felt::ZERO),
        })
    }

    #[tokio::test]
    async fn add_transaction_returns_success_response_unchanged() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/gateway/add_transaction");
                then.status(200)
                    .json_body(json!({"code": "TRANSACTION_RECEIVED", "transaction_hash": "0x1234"}));
            })
            .await;

        let response = provider(&server).add_transaction(&invoke_tx(), None).await.unwrap();
        mock.assert_async().await;
        assert!(response.is_success());
        assert_eq!(response.transaction_hash, Some(Felt::from_hex_unchecked("0x1234")));
    }

    #[tokio::test]
    async fn non_success_code_carries_the_raw_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/gateway/add_transaction");
                then.status(200).body(r#"{"code": "test"}"#);
            })
            .await;

        let err = provider(&server).add_transaction(&invoke_tx(), None).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Transaction failed because:\n"), "got: {message}");
        assert!(message.contains(r#"{"code": "test"}"#), "got: {message}");
        assert!(message.ends_with('.'), "got: {message}");
    }

    #[tokio::test]
    async fn token_is_forwarded_as_query_parameter() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/gateway/add_transaction").query_param("token", "t0k3n");
                then.status(200).json_body(json!({"code": "TRANSACTION_RECEIVED", "transaction_hash": "0x1"}));
            })
            .await;

        provider(&server).add_transaction(&invoke_tx(), Some("t0k3n")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn call_contract_returns_the_result_field() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/feeder_gateway/call_contract").query_param("blockNumber", "pending");
                then.status(200).json_body(json!({"result": ["0x2", "0x7"]}));
            })
            .await;

        let call = FunctionCall {
            contract_address: Felt::from_hex_unchecked("0x123"),
            entry_point_selector: Felt::from_hex_unchecked("0x456"),
            calldata: vec![],
            signature: vec![],
        };
        let result = provider(&server).call_contract(&call).await.unwrap();
        assert_eq!(result, vec![Felt::TWO, Felt::from(7u64)]);
    }

    #[tokio::test]
    async fn feeder_rejections_classify_like_gateway_ones() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/feeder_gateway/call_contract");
                then.status(500).json_body(json!({
                    "code": "StarknetErrorCode.UNINITIALIZED_CONTRACT",
                    "message": "Contract with address 0x123 is not deployed."
                }));
            })
            .await;

        let call = FunctionCall {
            contract_address: Felt::from_hex_unchecked("0x123"),
            entry_point_selector: Felt::from_hex_unchecked("0x456"),
            calldata: vec![],
            signature: vec![],
        };
        let err = provider(&server).call_contract(&call).await.unwrap_err();
        assert_matches!(err, GatewayClientError::TransactionRejected { raw } => {
            assert!(raw.contains("UNINITIALIZED_CONTRACT"));
        });
    }

    #[tokio::test]
    async fn get_nonce_parses_the_hex_string() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/feeder_gateway/get_nonce").query_param("contractAddress", "0x123");
                then.status(200).body("\"0x5\"");
            })
            .await;

        let nonce = provider(&server).get_nonce(Felt::from_hex_unchecked("0x123")).await.unwrap();
        mock.assert_async().await;
        assert_eq!(nonce, Felt::from(5u64));
    }

    #[tokio::test]
    async fn get_transaction_status_maps_the_report() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/feeder_gateway/get_transaction_status")
                    .query_param("transactionHash", "0xabc");
                then.status(200).json_body(json!({"tx_status": "ACCEPTED_ON_L2", "block_hash": "0x1"}));
            })
            .await;

        let report = provider(&server).get_transaction_status(Felt::from_hex_unchecked("0xabc")).await.unwrap();
        assert_eq!(report.tx_status, TransactionStatus::AcceptedOnL2);
        assert_eq!(report.block_hash, Some(Felt::ONE));
    }

    #[tokio::test]
    async fn transport_failures_surface_as_network_errors() {
        // Nothing listens on this port.
        let provider = GatewayProvider::new_from_base_path("http://127.0.0.1:9".parse().unwrap());
        let err = provider.get_nonce(Felt::ONE).await.unwrap_err();
        assert_matches!(err, GatewayClientError::Network { .. });
    }

    #[tokio::test]
    async fn garbage_success_body_is_an_unexpected_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/feeder_gateway/get_nonce");
                then.status(200).body("not json");
            })
            .await;

        let err = provider(&server).get_nonce(Felt::ONE).await.unwrap_err();
        assert_matches!(err, GatewayClientError::UnexpectedResponse { .. });
    }
}
