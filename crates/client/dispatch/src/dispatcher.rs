use crate::contract_ref::{ContractRef, ResolutionError, ResolvedContract};
use oc_gateway_client::{GatewayClientError, GatewayProvider};
use oc_registry::DeploymentRegistry;
use oc_status::{StatusError, StatusReport, StatusTracker, WatchMode};
use op_chain_config::NetworkConfig;
use op_gateway::{
    FunctionCall, InvokeFunctionTransaction, QueryFlag, StarknetError, StarknetErrorCode, UserTransaction,
};
use op_utils::service::ServiceContext;
use starknet_core::utils::get_selector_from_name;
use starknet_types_core::felt::Felt;
use std::sync::Arc;

/// Message the sequencer attaches when an invoke carries no max fee.
const MISSING_MAX_FEE_MARKER: &str = "max_fee must be bigger than 0.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Feeder read.
    Call,
    /// Gateway write.
    Invoke,
}

/// Optional knobs for [`Dispatcher::call_or_invoke`].
#[derive(Debug, Default, Clone)]
pub struct InvokeOptions {
    pub signature: Option<(Felt, Felt)>,
    pub max_fee: Option<Felt>,
    pub query: Option<QueryFlag>,
    pub watch: Option<WatchMode>,
}

/// Explicit outcome of a dispatch. Executor failures are values here, not
/// errors: the dispatch boundary never raises them.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Feeder read output, in result order.
    CallResult(Vec<Felt>),
    /// Gateway write accepted; the hash is a typed field.
    Invoked { address: Felt, transaction_hash: Felt },
    /// Fee estimation / simulation output, opaque to this layer.
    QueryResult(serde_json::Value),
    /// Watch-mode result, replacing the raw invoke output.
    Tracked(StatusReport),
    /// The executor failed; a diagnostic has already been logged.
    Failed(DispatchFailure),
}

impl DispatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchFailure {
    /// The gateway refused the invoke for lack of a max fee; a guided
    /// remediation line has been logged.
    #[error("max fee is missing or zero")]
    MaxFeeMissing,
    /// Post-invoke watching failed (timeout, cancellation, transport).
    #[error(transparent)]
    Watch(StatusError),
    /// Any other executor failure, logged verbatim.
    #[error("{0}")]
    Execution(String),
}

#[derive(Debug, thiserror::Error)]
enum ExecuteError {
    #[error(transparent)]
    Gateway(#[from] GatewayClientError),
    #[error("`{0}` is not a valid entry point name")]
    UnknownEntryPoint(String),
    #[error("gateway accepted the transaction but returned no transaction hash")]
    MissingTransactionHash,
}

enum Executed {
    Call(Vec<Felt>),
    Query(serde_json::Value),
    Invoke { address: Felt, transaction_hash: Felt },
}

pub struct Dispatcher {
    provider: Arc<GatewayProvider>,
    registry: DeploymentRegistry,
    tracker: StatusTracker,
    network: String,
}

impl Dispatcher {
    pub fn new(provider: Arc<GatewayProvider>, registry: DeploymentRegistry, network: &NetworkConfig) -> Self {
        let tracker = StatusTracker::new(Arc::clone(&provider));
        Self { provider, registry, tracker, network: network.name.clone() }
    }

    /// Swaps the status tracker (tests, custom polling schedules).
    pub fn with_tracker(mut self, tracker: StatusTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub(crate) fn provider(&self) -> &GatewayProvider {
        &self.provider
    }

    pub(crate) fn registry(&self) -> &DeploymentRegistry {
        &self.registry
    }

    pub(crate) fn network(&self) -> &str {
        &self.network
    }

    /// Resolves `contract` and routes to a feeder read or a gateway write.
    ///
    /// Only resolution failures propagate. Everything the executor throws is
    /// logged once and folded into [`DispatchOutcome::Failed`]; the missing
    /// max-fee rejection gets its own variant and a remediation hint. With
    /// `watch` set (and no query flag), a successful invoke hands its typed
    /// hash to the status tracker and the report becomes the outcome.
    pub async fn call_or_invoke(
        &self,
        contract: ContractRef<'_>,
        kind: CallKind,
        method: &str,
        calldata: Vec<Felt>,
        options: InvokeOptions,
        ctx: &ServiceContext,
    ) -> Result<DispatchOutcome, ResolutionError> {
        let target = contract.resolve(&self.registry, &self.network)?;

        let executed = match self.execute(&target, kind, method, calldata, &options).await {
            Ok(executed) => executed,
            Err(err) => return Ok(translate_failure(err)),
        };

        match executed {
            Executed::Call(values) => Ok(DispatchOutcome::CallResult(values)),
            Executed::Query(value) => Ok(DispatchOutcome::QueryResult(value)),
            Executed::Invoke { address, transaction_hash } => {
                tracing::info!("Invoke transaction was sent.");
                tracing::info!("Contract address: {address:#x}");
                tracing::info!("Transaction hash: {transaction_hash:#x}");

                match options.watch {
                    Some(mode) if options.query.is_none() => {
                        match self.tracker.status(transaction_hash, mode, ctx).await {
                            Ok(report) => Ok(DispatchOutcome::Tracked(report)),
                            Err(err) => {
                                tracing::error!("{err}");
                                Ok(DispatchOutcome::Failed(DispatchFailure::Watch(err)))
                            }
                        }
                    }
                    _ => Ok(DispatchOutcome::Invoked { address, transaction_hash }),
                }
            }
        }
    }

    async fn execute(
        &self,
        target: &ResolvedContract,
        kind: CallKind,
        method: &str,
        calldata: Vec<Felt>,
        options: &InvokeOptions,
    ) -> Result<Executed, ExecuteError> {
        let entry_point_selector =
            get_selector_from_name(method).map_err(|_| ExecuteError::UnknownEntryPoint(method.to_string()))?;
        let signature = options.signature.map(|(r, s)| vec![r, s]).unwrap_or_default();

        match kind {
            CallKind::Call => {
                let call = FunctionCall {
                    contract_address: target.address,
                    entry_point_selector,
                    calldata,
                    signature,
                };
                Ok(Executed::Call(self.provider.call_contract(&call).await?))
            }
            CallKind::Invoke => {
                let mut tx = InvokeFunctionTransaction {
                    contract_address: target.address,
                    entry_point_selector,
                    calldata,
                    signature,
                    max_fee: options.max_fee.unwrap_or(Felt::ZERO),
                    version: Felt::ZERO,
                    nonce: None,
                };
                if let Some(flag) = options.query {
                    tx = tx.into_query(flag);
                    let value =
                        self.provider.query_transaction(&UserTransaction::InvokeFunction(tx), flag).await?;
                    return Ok(Executed::Query(value));
                }

                let response = self.provider.add_transaction(&UserTransaction::InvokeFunction(tx), None).await?;
                let transaction_hash =
                    response.transaction_hash.ok_or(ExecuteError::MissingTransactionHash)?;
                Ok(Executed::Invoke { address: target.address, transaction_hash })
            }
        }
    }
}

/// One log line per failure, then fold it into the outcome.
fn translate_failure(err: ExecuteError) -> DispatchOutcome {
    if is_missing_max_fee(&err) {
        tracing::error!("Whoops, looks like max fee is missing. Try with:\n--max-fee=`MAX_FEE`");
        return DispatchOutcome::Failed(DispatchFailure::MaxFeeMissing);
    }
    tracing::error!("{err}");
    DispatchOutcome::Failed(DispatchFailure::Execution(err.to_string()))
}

/// The max-fee rejection is classified here, once, into its typed variant;
/// downstream code matches the variant, never the message.
fn is_missing_max_fee(err: &ExecuteError) -> bool {
    let ExecuteError::Gateway(GatewayClientError::TransactionRejected { raw }) = err else {
        return false;
    };
    match serde_json::from_str::<StarknetError>(raw) {
        Ok(error) => {
            error.code == StarknetErrorCode::InsufficientMaxFee || error.message.contains(MISSING_MAX_FEE_MARKER)
        }
        Err(_) => raw.contains(MISSING_MAX_FEE_MARKER),
    }
}
