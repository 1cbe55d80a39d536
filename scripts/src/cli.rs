//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{
        deploy_options_token_infra, deploy_swapper, initiate_upgrade, prepare_upgrade, upgrade,
        upgrade_status, DeployContext,
    },
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIG_PATH, FORGE_COMMAND},
    errors::ScriptError,
    networks::Network,
    types::ContractName,
};

/// Deploy and manage the options token contracts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Network to run against
    #[arg(short, long, env = "NETWORK", default_value = "local")]
    pub network: Network,

    /// Network RPC URL, defaults to the network's public endpoint
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Private key of the deployer
    #[arg(short, long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub priv_key: String,

    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// File in which to record the addresses of deployed contracts
    #[arg(short, long)]
    pub deployments: Option<PathBuf>,

    /// Block explorer API key, Sourcify is used for verification without one
    #[arg(long, env = "ETHERSCAN_KEY", hide_env_values = true)]
    pub etherscan_key: Option<String>,

    /// Skip block explorer verification of deployed contracts
    #[arg(long)]
    pub no_verify: bool,

    /// The `forge` binary used for verification
    #[arg(long, env = "FORGE", default_value = FORGE_COMMAND)]
    pub forge: String,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

/// The scripts that can be run
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the swapper, or attach to an existing one
    DeploySwapper(DeployArgs),
    /// Deploy the oracle, options token, exercise and compounder contracts,
    /// attaching to existing deployments for those not requested
    DeployInfra(DeployArgs),
    /// Deploy a new implementation for an upgradeable contract
    PrepareUpgrade(PrepareUpgradeArgs),
    /// Start the upgrade cooldown of an options token proxy
    InitiateUpgrade(InitiateUpgradeArgs),
    /// Report whether an options token proxy can currently be upgraded
    UpgradeStatus(UpgradeStatusArgs),
    /// Upgrade an options token proxy once its cooldown has elapsed
    Upgrade(UpgradeArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, ctx: DeployContext) -> Result<(), ScriptError> {
        match self {
            Command::DeploySwapper(args) => deploy_swapper(args, &ctx).await.map(|_| ()),
            Command::DeployInfra(args) => deploy_options_token_infra(args, &ctx).await,
            Command::PrepareUpgrade(args) => prepare_upgrade(args, &ctx).await,
            Command::InitiateUpgrade(args) => initiate_upgrade(args, &ctx).await,
            Command::UpgradeStatus(args) => upgrade_status(args, &ctx).await,
            Command::Upgrade(args) => upgrade(args, &ctx).await,
        }
    }
}

/// Arguments shared by the deployment scripts
#[derive(Args)]
pub struct DeployArgs {
    /// Path to the JSON deployment configuration
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Deploy a new implementation contract, to be proposed for an upgrade
#[derive(Args)]
pub struct PrepareUpgradeArgs {
    /// The upgradeable contract the implementation is for
    #[arg(long)]
    pub contract: ContractName,

    /// The artifact to deploy, defaults to the contract's own artifact
    #[arg(long)]
    pub artifact: Option<String>,
}

/// Arguments for starting the upgrade cooldown of an options token proxy
#[derive(Args)]
pub struct InitiateUpgradeArgs {
    /// Address of the proxy contract, read from the deployments file if omitted
    #[arg(long)]
    pub proxy: Option<String>,

    /// Address of the implementation the proxy will be upgraded to, read
    /// from the deployments file if omitted
    #[arg(long)]
    pub implementation: Option<String>,
}

/// Arguments for upgrading an options token proxy
#[derive(Args)]
pub struct UpgradeArgs {
    /// Address of the proxy contract, read from the deployments file if omitted
    #[arg(long)]
    pub proxy: Option<String>,

    /// Address of the new implementation contract, read from the deployments
    /// file if omitted
    #[arg(long)]
    pub implementation: Option<String>,

    /// Send the upgrade without checking the cooldown first
    #[arg(long)]
    pub force: bool,
}

/// Arguments for inspecting the upgrade cooldown of a proxy
#[derive(Args)]
pub struct UpgradeStatusArgs {
    /// Address of the proxy contract, read from the deployments file if omitted
    #[arg(long)]
    pub proxy: Option<String>,

    /// An implementation to check the upgrade against
    #[arg(long)]
    pub implementation: Option<String>,
}
