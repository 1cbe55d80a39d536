//! Utilities for the deploy scripts.

use std::{fs, path::Path, str::FromStr};

use alloy::{
    contract::{CallBuilder, CallDecoder, Error as ContractError},
    network::Ethereum,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::{http::reqwest::Url, TransportError},
};
use alloy_sol_types::{Revert, SolError};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{errors::ScriptError, networks::Network};

/// The signing provider used by the scripts
pub type DeployClient = DynProvider<Ethereum>;

/// Sets up a signing client for the given network, checking that the node
/// at `rpc_url` serves the network's chain.
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
    network: Network,
) -> Result<DeployClient, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let deployer = signer.address();
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    if chain_id != network.chain_id() {
        return Err(ScriptError::ChainIdMismatch {
            expected: network.chain_id(),
            actual: chain_id,
        });
    }

    info!("Connected to {network} (chain {chain_id}) as {deployer:#x}");
    Ok(DynProvider::new(provider))
}

/// The message prefix nodes put before a revert reason
const EXECUTION_REVERTED_PREFIX: &str = "execution reverted: ";

/// Send a transaction and wait for its receipt, failing if it reverts
pub async fn send_tx<P: Provider, C: CallDecoder>(
    tx: CallBuilder<P, C, Ethereum>,
) -> Result<TransactionReceipt, ScriptError> {
    let receipt = tx
        .send()
        .await
        .map_err(|e| match revert_reason(&e) {
            Some(reason) => ScriptError::ContractInteraction(format!("reverted: {reason}")),
            None => ScriptError::ContractInteraction(e.to_string()),
        })?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractInteraction(format!(
            "tx {:#x} reverted",
            receipt.transaction_hash
        )));
    }

    debug!("tx {:#x} succeeded", receipt.transaction_hash);
    Ok(receipt)
}

/// Extract the revert reason from a failed contract call, if the node returned one
pub fn revert_reason(err: &ContractError) -> Option<String> {
    let ContractError::TransportError(TransportError::ErrorResp(payload)) = err else {
        return None;
    };

    payload
        .as_revert_data()
        .and_then(|data| Revert::abi_decode(&data).ok())
        .map(|revert| revert.reason)
        .or_else(|| {
            payload
                .message
                .strip_prefix(EXECUTION_REVERTED_PREFIX)
                .map(str::to_string)
        })
}

/// Parse a hex address given on the command line
pub fn parse_address(address: &str) -> Result<Address, ScriptError> {
    Address::from_str(address).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// Read an address from the deployments file
pub fn read_deployment(deployments_path: &Path, key: &str) -> Result<Address, ScriptError> {
    let json = read_deployments(deployments_path)?;
    let addr_str = json
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ScriptError::ReadDeployments(format!("key {key} not found")))?;

    Address::from_str(addr_str).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Record a deployed address in the deployments file, creating the file if
/// it does not exist and preserving every other key
pub fn write_deployed_address(
    deployments_path: &Path,
    key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut json = if deployments_path.exists() {
        read_deployments(deployments_path)?
    } else {
        Map::new()
    };
    json.insert(key.to_string(), Value::String(format!("{address:#x}")));

    let contents = serde_json::to_string_pretty(&Value::Object(json))
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    fs::write(deployments_path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

/// Read the deployments file as a JSON object
fn read_deployments(deployments_path: &Path) -> Result<Map<String, Value>, ScriptError> {
    let contents = fs::read_to_string(deployments_path).map_err(|e| {
        ScriptError::ReadDeployments(format!("{}: {}", deployments_path.display(), e))
    })?;

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ScriptError::ReadDeployments(
            "deployments file is not a JSON object".to_string(),
        )),
        Err(e) => Err(ScriptError::ReadDeployments(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use alloy::primitives::address;
    use tempfile::TempDir;

    use alloy::{
        providers::{DynProvider, ProviderBuilder},
        transports::http::reqwest::Url,
    };

    use super::{parse_address, read_deployment, send_tx, write_deployed_address, DeployClient};
    use crate::{errors::ScriptError, solidity::OptionsToken};

    /// An RPC endpoint nothing listens on
    const UNREACHABLE_RPC_URL: &str = "http://127.0.0.1:1";

    #[tokio::test]
    async fn test_send_tx_through_borrowed_client() {
        let url = Url::parse(UNREACHABLE_RPC_URL).unwrap();
        let client: DeployClient = DynProvider::new(ProviderBuilder::new().connect_http(url));
        let token = address!("2222222222222222222222222222222222222222");
        let exercise = address!("3333333333333333333333333333333333333333");

        let token = OptionsToken::new(token, &client);
        let res = send_tx(token.setExerciseContract(exercise, true)).await;
        assert!(matches!(res, Err(ScriptError::ContractInteraction(_))));
    }

    #[test]
    fn test_write_then_read_deployments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployments.json");
        let token = address!("2222222222222222222222222222222222222222");
        let oracle = address!("3333333333333333333333333333333333333333");

        write_deployed_address(&path, "OptionsToken", token).unwrap();
        write_deployed_address(&path, "ThenaOracle", oracle).unwrap();

        assert_eq!(read_deployment(&path, "OptionsToken").unwrap(), token);
        assert_eq!(read_deployment(&path, "ThenaOracle").unwrap(), oracle);
    }

    #[test]
    fn test_write_preserves_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, r#"{ "note": "mainnet" }"#).unwrap();

        let swapper = address!("1111111111111111111111111111111111111111");
        write_deployed_address(&path, "Swapper", swapper).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"note\": \"mainnet\""));
        assert_eq!(read_deployment(&path, "Swapper").unwrap(), swapper);
    }

    #[test]
    fn test_missing_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, "{}").unwrap();

        let res = read_deployment(&path, "OptionsCompounder");
        assert!(matches!(res, Err(ScriptError::ReadDeployments(_))));
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0x1E71AEE6081f62053123140aacC7a06021D77348").is_ok());
        assert!(parse_address("0x1234").is_err());
    }
}
