//! Definition of the CLI arguments for integration tests

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_DEVNET_HOSTPORT, DEFAULT_DEVNET_PKEY};

/// CLI tool for running integration tests against a running Anvil node.
///
/// Contracts are deployed by the tests themselves from the compiled artifacts.
#[derive(Parser)]
pub(crate) struct Cli {
    /// Test to run, all tests are run if omitted
    #[arg(short, long)]
    pub(crate) test: Option<String>,

    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub(crate) artifacts: PathBuf,

    /// Devnet private key, defaults to the first Anvil account
    #[arg(short, long, env = "PRIVATE_KEY", default_value = DEFAULT_DEVNET_PKEY)]
    pub(crate) priv_key: String,

    /// Devnet RPC URL, defaults to the default Anvil hostport
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_DEVNET_HOSTPORT)]
    pub(crate) rpc_url: String,
}
