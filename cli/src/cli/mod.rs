use clap::{Args, Parser, Subcommand, ValueEnum};
use oc_status::WatchMode;
use op_chain_config::NetworkId;
use op_gateway::QueryFlag;
use op_utils::parsers::{parse_felt, FeltParseError};
use starknet_types_core::felt::Felt;
use std::path::PathBuf;

fn parse_network(s: &str) -> Result<NetworkId, std::convert::Infallible> {
    s.parse()
}

fn parse_felt_arg(s: &str) -> Result<Felt, FeltParseError> {
    parse_felt(s)
}

#[derive(Debug, Parser)]
#[command(name = "obelisk", about = "Deploy, call and invoke StarkNet contracts", version)]
pub struct RunCmd {
    #[command(flatten)]
    pub network_params: NetworkParams,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(global = true, short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct NetworkParams {
    /// Network selector: mainnet, sepolia, integration, localhost or a name
    /// declared in the networks file. `testnet` and `127.0.0.1` spellings
    /// normalize to sepolia and localhost.
    #[arg(
        global = true,
        long,
        env = "STARKNET_NETWORK",
        default_value = "localhost",
        value_parser = parse_network
    )]
    pub network: NetworkId,

    /// YAML file declaring custom networks.
    #[arg(global = true, long, env = "OBELISK_NETWORKS_FILE", value_name = "PATH")]
    pub networks_file: Option<PathBuf>,

    /// Project root; the per-network deployment stores live here.
    #[arg(global = true, long, default_value = ".", value_name = "DIR")]
    pub project_root: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy a compiled contract artifact and register its address.
    Deploy {
        /// Path to the compiled artifact JSON.
        artifact: PathBuf,
        /// Constructor arguments (decimal or 0x hex).
        args: Vec<String>,
        /// Address salt.
        #[arg(long, value_parser = parse_felt_arg)]
        salt: Option<Felt>,
        /// Extra registry identifier for the deployment.
        #[arg(long)]
        alias: Option<String>,
        /// Gateway token, needed for whitelisted networks.
        #[arg(long)]
        token: Option<String>,
    },
    /// Declare a contract class.
    Declare {
        /// Path to the compiled artifact JSON.
        artifact: PathBuf,
        /// Signature over the declaration, as `R S`.
        #[arg(long, num_args = 2, value_parser = parse_felt_arg, value_names = ["R", "S"])]
        signature: Option<Vec<Felt>>,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        token: Option<String>,
    },
    /// Deploy and register an account contract for a signer.
    Setup {
        /// Name of the environment variable holding the signer's private key.
        signer: String,
        /// Compiled account contract artifact.
        #[arg(long, value_name = "PATH")]
        artifact: PathBuf,
    },
    /// Invoke a contract method through a signer's account relay.
    Send {
        /// Name of the environment variable holding the signer's private key.
        signer: String,
        /// Registry identifier or 0x address of the target contract.
        contract: String,
        method: String,
        params: Vec<String>,
        #[arg(long, value_parser = parse_felt_arg)]
        nonce: Option<Felt>,
        #[arg(long, value_parser = parse_felt_arg)]
        max_fee: Option<Felt>,
    },
    /// Invoke a contract method directly.
    Invoke {
        /// Registry identifier or 0x address of the target contract.
        contract: String,
        method: String,
        params: Vec<String>,
        #[arg(long, value_parser = parse_felt_arg)]
        max_fee: Option<Felt>,
        /// Estimate or simulate instead of executing.
        #[arg(long, value_enum)]
        query: Option<QueryArg>,
        /// Follow the transaction after submission.
        #[arg(long, value_enum)]
        watch: Option<WatchArg>,
    },
    /// Call a read-only contract method.
    Call {
        /// Registry identifier or 0x address of the target contract.
        contract: String,
        method: String,
        params: Vec<String>,
    },
    /// Report (or follow) a transaction's finality.
    Status {
        /// Transaction hash.
        #[arg(value_parser = parse_felt_arg)]
        tx_hash: Felt,
        /// `track` reports once; `debug` polls to finality.
        #[arg(long, value_enum, default_value_t = WatchArg::Track)]
        mode: WatchArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WatchArg {
    Track,
    Debug,
}

impl std::fmt::Display for WatchArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Track => f.write_str("track"),
            Self::Debug => f.write_str("debug"),
        }
    }
}

impl From<WatchArg> for WatchMode {
    fn from(arg: WatchArg) -> Self {
        match arg {
            WatchArg::Track => WatchMode::Track,
            WatchArg::Debug => WatchMode::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryArg {
    Simulate,
    EstimateFee,
}

impl From<QueryArg> for QueryFlag {
    fn from(arg: QueryArg) -> Self {
        match arg {
            QueryArg::Simulate => QueryFlag::Simulate,
            QueryArg::EstimateFee => QueryFlag::EstimateFee,
        }
    }
}
