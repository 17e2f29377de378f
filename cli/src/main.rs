//! Obelisk command line.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Command, RunCmd};
use oc_account::{account_identifier, Account, LocalSigner, Signer};
use oc_dispatch::{
    CallKind, ContractRef, DeclareRequest, DeployRequest, DispatchOutcome, Dispatcher, InvokeOptions,
};
use oc_gateway_client::GatewayProvider;
use oc_registry::DeploymentRegistry;
use oc_status::StatusTracker;
use op_chain_config::NetworkConfig;
use op_utils::calldata::calldata_from_cli;
use op_utils::service::ServiceContext;
use starknet_types_core::felt::Felt;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let run_cmd = RunCmd::parse();
    setup_logging(run_cmd.verbose);

    let network =
        NetworkConfig::resolve(&run_cmd.network_params.network, run_cmd.network_params.networks_file.as_deref())
            .context("Resolving network endpoints")?;
    let provider = Arc::new(GatewayProvider::from_network(&network));
    let registry = DeploymentRegistry::new(&run_cmd.network_params.project_root);
    let dispatcher = Dispatcher::new(Arc::clone(&provider), registry.clone(), &network);

    // One context per invocation; ctrl-c cancels in-flight polling between
    // network round trips.
    let ctx = ServiceContext::new();
    {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, stopping");
                ctx.cancel();
            }
        });
    }

    match run_cmd.command {
        Command::Deploy { artifact, args, salt, alias, token } => {
            let constructor_calldata = calldata_from_cli(&args)?;
            dispatcher
                .deploy(DeployRequest {
                    artifact: &artifact,
                    constructor_calldata,
                    salt,
                    alias,
                    token: token.as_deref(),
                })
                .await?;
        }
        Command::Declare { artifact, signature, alias, token } => {
            dispatcher
                .declare(DeclareRequest {
                    artifact: &artifact,
                    signature: signature_pair(signature),
                    alias,
                    token: token.as_deref(),
                })
                .await?;
        }
        Command::Setup { signer, artifact } => {
            let signer = LocalSigner::from_env(&signer)?;
            let public_key = signer.public_key();
            let deployed = dispatcher
                .deploy(DeployRequest {
                    artifact: &artifact,
                    constructor_calldata: vec![public_key],
                    salt: None,
                    alias: Some(account_identifier(&public_key)),
                    token: None,
                })
                .await?;
            tracing::info!("⛩️  Account set up at {:#x}", deployed.address);
        }
        Command::Send { signer, contract, method, params, nonce, max_fee } => {
            let signer = Arc::new(LocalSigner::from_env(&signer)?);
            let account = Account::load(signer, &network, Arc::clone(&provider), registry)?;
            tracing::info!("Calling {method} on {contract} with params: {params:?}");
            let sent = account.send(&contract, &method, calldata_from_cli(&params)?, nonce, max_fee).await?;
            tracing::info!("Invoke transaction was sent.");
            tracing::info!("Contract address: {:#x}", sent.target_address);
            tracing::info!("Transaction hash: {:#x}", sent.transaction_hash);
        }
        Command::Invoke { contract, method, params, max_fee, query, watch } => {
            let options = InvokeOptions {
                signature: None,
                max_fee,
                query: query.map(Into::into),
                watch: watch.map(Into::into),
            };
            let outcome = dispatcher
                .call_or_invoke(
                    ContractRef::parse(&contract),
                    CallKind::Invoke,
                    &method,
                    calldata_from_cli(&params)?,
                    options,
                    &ctx,
                )
                .await?;
            report_outcome(outcome);
        }
        Command::Call { contract, method, params } => {
            let outcome = dispatcher
                .call_or_invoke(
                    ContractRef::parse(&contract),
                    CallKind::Call,
                    &method,
                    calldata_from_cli(&params)?,
                    InvokeOptions::default(),
                    &ctx,
                )
                .await?;
            report_outcome(outcome);
        }
        Command::Status { tx_hash, mode } => {
            let tracker = StatusTracker::new(provider);
            let report = tracker.status(tx_hash, mode.into(), &ctx).await?;
            tracing::info!("Transaction status: {}", report.status);
            if let Some(reason) = report.failure_reason {
                tracing::info!("Failure reason: {reason}");
            }
        }
    }

    Ok(())
}

/// Dispatch failures have already been logged by the boundary; the command
/// exits normally with the outcome as the only signal.
fn report_outcome(outcome: DispatchOutcome) {
    match outcome {
        DispatchOutcome::CallResult(values) => {
            let rendered: Vec<String> = values.iter().map(|value| format!("{value:#x}")).collect();
            tracing::info!("{}", rendered.join(" "));
        }
        DispatchOutcome::QueryResult(value) => tracing::info!("{value:#}"),
        DispatchOutcome::Tracked(report) => tracing::info!("Transaction status: {}", report.status),
        DispatchOutcome::Invoked { .. } => {}
        DispatchOutcome::Failed(_) => {}
    }
}

fn signature_pair(signature: Option<Vec<Felt>>) -> Option<(Felt, Felt)> {
    signature.and_then(|values| match values.as_slice() {
        [r, s] => Some((*r, *s)),
        _ => None,
    })
}

fn setup_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).without_time().init();
}
