//! Block explorer verification of deployed contracts, through `forge verify-contract`

use std::process::{Command, Stdio};

use alloy::primitives::{hex, Address};
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    constants::{
        ETHERSCAN_VERIFIER, FORGE_COMMAND, OPTIMIZER_RUNS, SOLC_VERSION, SOURCIFY_VERIFIER,
        VERIFY_CONTRACT_COMMAND,
    },
    networks::Network,
};

/// Where and whether deployed contracts are verified
#[derive(Clone, Debug)]
pub struct Verifier {
    /// The network the contracts are deployed to
    network: Network,
    /// The block explorer API key, Sourcify is used without one
    etherscan_key: Option<String>,
    /// Whether verification is enabled at all
    enabled: bool,
    /// The `forge` binary to run
    forge: String,
}

impl Verifier {
    /// Create a verifier for the given network
    pub fn new(network: Network, etherscan_key: Option<String>, enabled: bool) -> Self {
        Self {
            network,
            etherscan_key: etherscan_key.filter(|k| !k.is_empty()),
            enabled: enabled && network.supports_verification(),
            forge: FORGE_COMMAND.to_string(),
        }
    }

    /// Run the given `forge` binary instead of the one on the `PATH`
    pub fn with_forge(mut self, forge: impl Into<String>) -> Self {
        self.forge = forge.into();
        self
    }

    /// Build the `forge verify-contract` invocation for the given deployment
    pub fn command(&self, address: Address, contract: &str, ctor_args: &[u8]) -> Command {
        let mut cmd = Command::new(&self.forge);
        cmd.arg(VERIFY_CONTRACT_COMMAND)
            .arg(format!("{address:#x}"))
            .arg(contract)
            .arg("--chain-id")
            .arg(self.network.chain_id().to_string())
            .arg("--compiler-version")
            .arg(SOLC_VERSION)
            .arg("--num-of-optimizations")
            .arg(OPTIMIZER_RUNS.to_string())
            .arg("--watch");

        if !ctor_args.is_empty() {
            cmd.arg("--constructor-args").arg(hex::encode_prefixed(ctor_args));
        }

        match &self.etherscan_key {
            Some(key) => cmd
                .arg("--verifier")
                .arg(ETHERSCAN_VERIFIER)
                .arg("--etherscan-api-key")
                .arg(key),
            None => cmd.arg("--verifier").arg(SOURCIFY_VERIFIER),
        };

        cmd
    }

    /// Verify a deployed contract, returning whether it was verified
    ///
    /// The contract is already on chain, so a failure only warns: neither a
    /// rejected verification nor a missing `forge` aborts the run.
    pub fn verify(&self, address: Address, contract: &str, ctor_args: &[u8]) -> bool {
        if !self.enabled {
            return false;
        }

        let mut cmd = self.command(address, contract, ctor_args);
        info!(
            "Verifying {contract} at {address:#x}: {} {}",
            self.forge,
            cmd.get_args().map(|a| a.to_string_lossy()).join(" ")
        );
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());

        match cmd.status() {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!("Verification of {contract} at {address:#x} failed with {status}");
                false
            }
            Err(e) => {
                warn!(
                    "Verification of {contract} at {address:#x} skipped, failed to run {}: {e}",
                    self.forge
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::Verifier;
    use crate::networks::Network;

    fn args(verifier: &Verifier, ctor_args: &[u8]) -> Vec<String> {
        verifier
            .command(
                address!("1111111111111111111111111111111111111111"),
                "ThenaOracle",
                ctor_args,
            )
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_etherscan_command() {
        let verifier = Verifier::new(Network::Bsc, Some("KEY".to_string()), true);
        let args = args(&verifier, &[0xab, 0xcd]);

        assert_eq!(args[0], "verify-contract");
        assert_eq!(args[1], "0x1111111111111111111111111111111111111111");
        assert_eq!(args[2], "ThenaOracle");
        assert!(args.windows(2).any(|w| w == &["--chain-id", "56"]));
        assert!(args.windows(2).any(|w| w == &["--compiler-version", "0.8.23"]));
        assert!(args.windows(2).any(|w| w == &["--constructor-args", "0xabcd"]));
        assert!(args.windows(2).any(|w| w == &["--verifier", "etherscan"]));
        assert!(args.windows(2).any(|w| w == &["--etherscan-api-key", "KEY"]));
    }

    #[test]
    fn test_sourcify_without_key() {
        let verifier = Verifier::new(Network::Mode, Some(String::new()), true);
        let args = args(&verifier, &[]);

        assert!(args.windows(2).any(|w| w == &["--verifier", "sourcify"]));
        assert!(!args.iter().any(|a| a == "--constructor-args"));
        assert!(!args.iter().any(|a| a == "--etherscan-api-key"));
    }

    #[test]
    fn test_disabled_verifier_is_noop() {
        let verifier =
            Verifier::new(Network::Local, None, true).with_forge("/nonexistent/forge");
        assert!(!verifier.verify(
            address!("1111111111111111111111111111111111111111"),
            "ThenaOracle",
            &[]
        ));
    }

    #[test]
    fn test_missing_forge_does_not_fail() {
        let verifier =
            Verifier::new(Network::Bsc, None, true).with_forge("/nonexistent/forge");
        assert!(!verifier.verify(
            address!("1111111111111111111111111111111111111111"),
            "DiscountExercise",
            &[0xab]
        ));
    }
}
