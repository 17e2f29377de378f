//! Transaction finality tracking.
//!
//! `track` mode is a single status fetch; `debug` mode polls the feeder until
//! the transaction reaches a terminal status, bounded by a deadline and
//! cancellable between round trips.

use oc_gateway_client::{GatewayClientError, GatewayProvider};
use op_gateway::TransactionStatus;
use op_utils::service::ServiceContext;
use starknet_types_core::felt::Felt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// One status snapshot versus polling to finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Track,
    Debug,
}

impl FromStr for WatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "track" => Ok(Self::Track),
            "debug" => Ok(Self::Debug),
            other => Err(format!("`{other}` is not a watch mode (expected `track` or `debug`)")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
    /// Overall bound on debug-mode polling; exceeding it yields
    /// [`StatusError::PollTimeout`] instead of hanging.
    pub deadline: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(5), deadline: Duration::from_secs(120) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub transaction_hash: Felt,
    pub status: TransactionStatus,
    pub failure_reason: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// Outcome unknown: the transaction may still land. Distinct from a
    /// `REJECTED` report, which is a known failure.
    #[error("no terminal status for transaction {transaction_hash:#x} after {deadline:?} (last seen: {last_seen})")]
    PollTimeout {
        transaction_hash: Felt,
        deadline: Duration,
        last_seen: TransactionStatus,
    },
    #[error("status polling was cancelled")]
    Cancelled,
    #[error(transparent)]
    Gateway(#[from] GatewayClientError),
}

pub struct StatusTracker {
    provider: Arc<GatewayProvider>,
    config: TrackerConfig,
}

impl StatusTracker {
    pub fn new(provider: Arc<GatewayProvider>) -> Self {
        Self::with_config(provider, TrackerConfig::default())
    }

    pub fn with_config(provider: Arc<GatewayProvider>, config: TrackerConfig) -> Self {
        Self { provider, config }
    }

    /// Reports the transaction's status, once or to finality per `mode`.
    pub async fn status(
        &self,
        transaction_hash: Felt,
        mode: WatchMode,
        ctx: &ServiceContext,
    ) -> Result<StatusReport, StatusError> {
        match mode {
            WatchMode::Track => self.fetch(transaction_hash, ctx).await,
            WatchMode::Debug => self.poll_to_finality(transaction_hash, ctx).await,
        }
    }

    async fn fetch(&self, transaction_hash: Felt, ctx: &ServiceContext) -> Result<StatusReport, StatusError> {
        let report = ctx
            .run_until_cancelled(self.provider.get_transaction_status(transaction_hash))
            .await
            .ok_or(StatusError::Cancelled)??;
        Ok(StatusReport {
            transaction_hash,
            status: report.tx_status,
            failure_reason: report.tx_failure_reason.and_then(|reason| reason.error_message),
        })
    }

    async fn poll_to_finality(
        &self,
        transaction_hash: Felt,
        ctx: &ServiceContext,
    ) -> Result<StatusReport, StatusError> {
        let started = Instant::now();
        let mut last_seen = TransactionStatus::NotReceived;

        loop {
            let report = self.fetch(transaction_hash, ctx).await?;
            if report.status != last_seen {
                tracing::info!(target: "status", "transaction {transaction_hash:#x} is now {}", report.status);
                last_seen = report.status;
            }
            if report.status.is_terminal() {
                if let Some(reason) = &report.failure_reason {
                    tracing::info!(target: "status", "failure reason: {reason}");
                }
                return Ok(report);
            }
            if started.elapsed() >= self.config.deadline {
                return Err(StatusError::PollTimeout {
                    transaction_hash,
                    deadline: self.config.deadline,
                    last_seen,
                });
            }
            if ctx.run_until_cancelled(sleep(self.config.poll_interval)).await.is_none() {
                return Err(StatusError::Cancelled);
            }
        }
    }
}
