//! Integration tests for the options token contracts. These assume that an
//! Anvil node is already running locally.

use std::str::FromStr;

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use eyre::{bail, Result};
use scripts::{artifacts::Artifacts, networks::Network, utils::setup_client};
use test_inventory::{IntegrationTest, TestArgs};
use tracing_subscriber::EnvFilter;

mod abis;
mod cli;
mod constants;
mod test_inventory;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        test,
        artifacts,
        priv_key,
        rpc_url,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let signer_address = PrivateKeySigner::from_str(&priv_key)?.address();
    let client = setup_client(&priv_key, &rpc_url, Network::Local).await?;
    let args = TestArgs {
        client,
        artifacts: Artifacts::new(artifacts),
        signer_address,
    };

    let mut failures = 0;
    for integration_test in inventory::iter::<IntegrationTest> {
        if test.as_deref().is_some_and(|name| name != integration_test.name) {
            continue;
        }

        match (integration_test.test_fn)(args.clone()).await {
            Ok(()) => println!("{} {}", integration_test.name, "PASSED".green().bold()),
            Err(e) => {
                failures += 1;
                println!("{} {}: {e:?}", integration_test.name, "FAILED".red().bold());
            }
        }
    }

    if failures > 0 {
        bail!("{failures} integration test(s) failed");
    }

    Ok(())
}
