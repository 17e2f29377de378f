use crate::signer::{Signer, SignerError};
use oc_gateway_client::{GatewayClientError, GatewayProvider};
use oc_registry::{DeploymentRegistry, RegistryError};
use op_chain_config::NetworkConfig;
use op_gateway::{InvokeFunctionTransaction, UserTransaction};
use op_utils::parsers::parse_felt;
use starknet_core::crypto::compute_hash_on_elements;
use starknet_core::utils::get_selector_from_name;
use starknet_types_core::felt::Felt;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cairo short string `"invoke"`, the invoke hash domain prefix.
const PREFIX_INVOKE: Felt = Felt::from_hex_unchecked("0x696e766f6b65");
/// Account relays sign v1 invoke transactions.
const EXECUTE_VERSION: Felt = Felt::ONE;
/// Entry point every account contract relays through.
const EXECUTE_ENTRY_POINT: &str = "__execute__";

/// Registry identifier under which an account's address is stored.
pub fn account_identifier(public_key: &Felt) -> String {
    format!("account-{public_key:#x}")
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error(transparent)]
    Gateway(#[from] GatewayClientError),
    #[error("`{0}` is not a valid entry point name")]
    UnknownMethod(String),
    #[error("gateway accepted the transaction but returned no transaction hash")]
    MissingTransactionHash,
}

/// Result of a successful [`Account::send`]. The transaction hash is a typed
/// field here; nothing downstream ever re-parses it out of display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentTransaction {
    pub target_address: Felt,
    pub transaction_hash: Felt,
}

/// A per-invocation handle on an on-chain account contract.
///
/// Address and abi come from the deployment registry; nothing about the
/// account lives in memory across CLI runs.
pub struct Account {
    signer: Arc<dyn Signer>,
    pub address: Felt,
    pub abi: String,
    chain_id: Felt,
    network: String,
    provider: Arc<GatewayProvider>,
    registry: DeploymentRegistry,
    /// Next nonce to hand out, when known. Guarded by the same lock that
    /// serializes the fetch-sign-submit sequence.
    next_nonce: Mutex<Option<Felt>>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("abi", &self.abi)
            .field("network", &self.network)
            .finish()
    }
}

impl Account {
    pub fn new(
        signer: Arc<dyn Signer>,
        address: Felt,
        abi: impl Into<String>,
        network: &NetworkConfig,
        provider: Arc<GatewayProvider>,
        registry: DeploymentRegistry,
    ) -> Self {
        Self {
            signer,
            address,
            abi: abi.into(),
            chain_id: network.chain_id,
            network: network.name.clone(),
            provider,
            registry,
            next_nonce: Mutex::new(None),
        }
    }

    /// Loads the account registered for `signer` on `network`. Fails with
    /// [`RegistryError::NotFound`] when `setup` has not run yet.
    pub fn load(
        signer: Arc<dyn Signer>,
        network: &NetworkConfig,
        provider: Arc<GatewayProvider>,
        registry: DeploymentRegistry,
    ) -> Result<Self, AccountError> {
        let identifier = account_identifier(&signer.public_key());
        let record = registry.load_first(&identifier, &network.name)?;
        Ok(Self::new(signer, record.address, record.abi, network, provider, registry))
    }

    pub fn public_key(&self) -> Felt {
        self.signer.public_key()
    }

    /// Invokes `method` on `target` through this account's `__execute__`
    /// relay and returns the typed transaction hash.
    ///
    /// `target` is a registry identifier unless it is a literal `0x` address.
    /// When no nonce is supplied, the on-chain nonce is fetched from the
    /// feeder; the whole fetch-sign-submit sequence holds a per-instance lock
    /// so concurrent sends on one `Account` allocate strictly increasing
    /// nonces. Separate processes racing on the same account are not guarded.
    pub async fn send(
        &self,
        target: &str,
        method: &str,
        calldata: Vec<Felt>,
        nonce: Option<Felt>,
        max_fee: Option<Felt>,
    ) -> Result<SentTransaction, AccountError> {
        let target_address = self.resolve_target(target)?;
        let selector =
            get_selector_from_name(method).map_err(|_| AccountError::UnknownMethod(method.to_string()))?;
        let execute_selector = get_selector_from_name(EXECUTE_ENTRY_POINT)
            .map_err(|_| AccountError::UnknownMethod(EXECUTE_ENTRY_POINT.to_string()))?;
        let calldata = execute_calldata(target_address, selector, &calldata);
        let max_fee = max_fee.unwrap_or(Felt::ZERO);

        let mut next_nonce = self.next_nonce.lock().await;
        let nonce = match nonce {
            Some(nonce) => nonce,
            None => {
                let on_chain = self.provider.get_nonce(self.address).await?;
                // The feeder lags behind freshly accepted transactions; the
                // cached value keeps allocation monotonic within this process.
                match *next_nonce {
                    Some(cached) if cached > on_chain => cached,
                    _ => on_chain,
                }
            }
        };

        let hash = invoke_hash_v1(self.address, &calldata, max_fee, self.chain_id, nonce);
        let (r, s) = self.signer.sign(&hash).await?;
        let tx = UserTransaction::InvokeFunction(InvokeFunctionTransaction {
            contract_address: self.address,
            entry_point_selector: execute_selector,
            calldata,
            signature: vec![r, s],
            max_fee,
            version: EXECUTE_VERSION,
            nonce: Some(nonce),
        });

        let response = self.provider.add_transaction(&tx, None).await?;
        let transaction_hash = response.transaction_hash.ok_or(AccountError::MissingTransactionHash)?;
        *next_nonce = Some(nonce + Felt::ONE);
        drop(next_nonce);

        tracing::debug!(
            target: "account",
            "sent `{method}` to {target_address:#x} with nonce {nonce}, hash {transaction_hash:#x}"
        );
        Ok(SentTransaction { target_address, transaction_hash })
    }

    fn resolve_target(&self, target: &str) -> Result<Felt, AccountError> {
        if target.starts_with("0x") || target.starts_with("0X") {
            if let Ok(address) = parse_felt(target) {
                return Ok(address);
            }
        }
        Ok(self.registry.load_first(target, &self.network)?.address)
    }
}

/// Single-call `__execute__` calldata: `(to, selector, calldata)` with the
/// array length-prefixed per the Cairo convention.
fn execute_calldata(to: Felt, selector: Felt, params: &[Felt]) -> Vec<Felt> {
    let mut calldata = Vec::with_capacity(params.len() + 3);
    calldata.push(to);
    calldata.push(selector);
    calldata.push(Felt::from(params.len() as u64));
    calldata.extend_from_slice(params);
    calldata
}

/// The v1 invoke transaction hash: a pedersen chain over the execute payload
/// (the encoding itself comes from `starknet-core`).
fn invoke_hash_v1(sender: Felt, calldata: &[Felt], max_fee: Felt, chain_id: Felt, nonce: Felt) -> Felt {
    compute_hash_on_elements(&[
        PREFIX_INVOKE,
        EXECUTE_VERSION,
        sender,
        Felt::ZERO,
        compute_hash_on_elements(calldata),
        max_fee,
        chain_id,
        nonce,
    ])
}
