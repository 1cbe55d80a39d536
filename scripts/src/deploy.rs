//! Primitives for deploying contracts and attaching to existing ones

use std::str::FromStr;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};
use alloy_sol_types::SolConstructor;
use tracing::{debug, info, warn};

use crate::{
    artifacts::{Artifact, Artifacts},
    config::DeployConfig,
    constants::{
        NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT, NUM_DEPLOY_CONFIRMATIONS, PROXY_ARTIFACT_NAME,
        PROXY_IMPLEMENTATION_STORAGE_SLOT,
    },
    errors::ScriptError,
    solidity::ERC1967Proxy,
    types::ContractName,
    utils::DeployClient,
};

/// The addresses produced by a UUPS proxy deployment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProxyDeployment {
    /// The proxy, which is the address users interact with
    pub proxy: Address,
    /// The implementation behind the proxy
    pub implementation: Address,
}

/// What a deploy script should do for a given contract
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Deploy a fresh instance
    Deploy,
    /// Attach to the configured existing instance
    Attach(Address),
    /// Neither requested nor configured
    Skip,
}

impl Step {
    /// Attach to the given address if there is one, skip otherwise
    pub fn from_address(address: Option<Address>) -> Self {
        address.map_or(Step::Skip, Step::Attach)
    }
}

/// The outcome of a deploy-or-attach step
///
/// Later steps that depend on a contract go through [`Resolution::require`],
/// so an unavailable dependency fails where it is used, naming the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The contract was deployed by this run
    Deployed(Address),
    /// The contract was attached to at a configured address
    Attached(Address),
    /// The contract is not available to this run
    Unavailable,
}

impl Resolution {
    /// The contract's address, if it is available
    pub fn address(&self) -> Option<Address> {
        match self {
            Resolution::Deployed(addr) | Resolution::Attached(addr) => Some(*addr),
            Resolution::Unavailable => None,
        }
    }

    /// The contract's address, failing if a dependent step cannot proceed without it
    pub fn require(&self, contract: ContractName) -> Result<Address, ScriptError> {
        self.address()
            .ok_or(ScriptError::MissingDependency(contract.as_str()))
    }
}

/// Decide whether to deploy, attach to, or skip the given contract
pub fn resolve_step(config: &DeployConfig, contract: ContractName) -> Step {
    if config.should_deploy(contract) {
        return Step::Deploy;
    }

    match config.existing_address(contract) {
        Some(addr) => Step::Attach(addr),
        None => Step::Skip,
    }
}

/// Attach to an existing deployment
///
/// Failures are downgraded to a warning and an [`Resolution::Unavailable`]
/// result, the run continues without the contract.
pub async fn attach(
    client: &DeployClient,
    contract: ContractName,
    address: Option<Address>,
) -> Resolution {
    let Some(address) = address else {
        warn!(
            "{} NOT available due to lack of configuration ({} not set)",
            contract,
            contract.config_key()
        );
        return Resolution::Unavailable;
    };

    match client.get_code_at(address).await {
        Ok(code) if !code.is_empty() => {
            info!("{contract} attached at {address:#x}");
            Resolution::Attached(address)
        }
        Ok(_) => {
            warn!("{contract} NOT available: no code at {address:#x}");
            Resolution::Unavailable
        }
        Err(e) => {
            warn!("{contract} NOT available: {e}");
            Resolution::Unavailable
        }
    }
}

/// Deploy a contract from its artifact, appending the ABI-encoded constructor
/// arguments to the creation code
pub async fn deploy_contract(
    client: &DeployClient,
    artifact: &Artifact,
    ctor_args: Vec<u8>,
) -> Result<Address, ScriptError> {
    debug!("Deploying {} from {}", artifact.name, artifact.path.display());
    let mut code = artifact.bytecode.to_vec();
    code.extend(ctor_args);

    let tx = TransactionRequest::default().with_deploy_code(code);
    let receipt = client
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", artifact.name, e)))?
        .with_required_confirmations(NUM_DEPLOY_CONFIRMATIONS)
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", artifact.name, e)))?;

    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "{} creation reverted in tx {:#x}",
            artifact.name, receipt.transaction_hash
        )));
    }

    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!("{} receipt has no contract address", artifact.name))
    })
}

/// Deploy an implementation behind a fresh `ERC1967Proxy`, calling the given
/// initializer calldata through the proxy in the same transaction
pub async fn deploy_uups_proxy(
    client: &DeployClient,
    artifacts: &Artifacts,
    implementation_name: &str,
    init_calldata: Vec<u8>,
) -> Result<ProxyDeployment, ScriptError> {
    let implementation_artifact = artifacts.load(implementation_name)?;
    let proxy_artifact = artifacts.load(PROXY_ARTIFACT_NAME)?;

    let implementation = deploy_contract(client, &implementation_artifact, vec![]).await?;

    let proxy_args = proxy_constructor_args(implementation, init_calldata);
    let proxy = deploy_contract(client, &proxy_artifact, proxy_args).await?;

    // The proxy reports the implementation it forwards to through the EIP-1967 slot
    let reported = implementation_address(client, proxy).await?;
    if reported != implementation {
        return Err(ScriptError::ContractDeployment(format!(
            "proxy {proxy:#x} points at {reported:#x}, expected {implementation:#x}"
        )));
    }

    Ok(ProxyDeployment {
        proxy,
        implementation,
    })
}

/// ABI-encode the `ERC1967Proxy` constructor arguments: the implementation and
/// the initializer calldata delegated to it on construction
pub fn proxy_constructor_args(implementation: Address, init_calldata: Vec<u8>) -> Vec<u8> {
    ERC1967Proxy::constructorCall {
        implementation,
        data: init_calldata.into(),
    }
    .abi_encode()
}

/// Read the implementation address of an EIP-1967 proxy
pub async fn implementation_address(
    client: &DeployClient,
    proxy: Address,
) -> Result<Address, ScriptError> {
    let slot = U256::from_str(PROXY_IMPLEMENTATION_STORAGE_SLOT)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
    let value = client
        .get_storage_at(proxy, slot)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(address_from_slot(value))
}

/// Take the address held in the low bytes of a storage word
fn address_from_slot(value: U256) -> Address {
    let word = value.to_be_bytes::<NUM_BYTES_STORAGE_SLOT>();
    Address::from_slice(&word[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..])
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{address, Address, Bytes, U256},
        providers::{DynProvider, ProviderBuilder},
        transports::http::reqwest::Url,
    };
    use alloy_sol_types::SolValue;

    use super::{
        address_from_slot, attach, proxy_constructor_args, resolve_step, Resolution, Step,
    };
    use crate::{
        config::DeployConfig, constants::LOCAL_RPC_URL, errors::ScriptError,
        types::ContractName, utils::DeployClient,
    };

    /// A client for a node that is never contacted
    fn offline_client() -> DeployClient {
        let url = Url::parse(LOCAL_RPC_URL).unwrap();
        DynProvider::new(ProviderBuilder::new().connect_http(url))
    }

    #[tokio::test]
    async fn test_attach_without_address_is_unavailable() {
        let client = offline_client();
        for contract in [ContractName::Swapper, ContractName::ThenaOracle] {
            assert_eq!(attach(&client, contract, None).await, Resolution::Unavailable);
        }
    }

    #[test]
    fn test_proxy_constructor_args() {
        let implementation = address!("1111111111111111111111111111111111111111");
        let init_calldata = vec![0xde, 0xad, 0xbe, 0xef, 0x01];

        let encoded = proxy_constructor_args(implementation, init_calldata.clone());
        let (decoded_impl, decoded_data) =
            <(Address, Bytes)>::abi_decode_params(&encoded).unwrap();

        assert_eq!(decoded_impl, implementation);
        assert_eq!(decoded_data, Bytes::from(init_calldata));
    }

    #[test]
    fn test_resolve_step() {
        let config = DeployConfig::from_json(
            r#"{
                "CONTRACTS_TO_DEPLOY": ["OptionsToken"],
                "OPTIONS_TOKEN": "0x2222222222222222222222222222222222222222",
                "ORACLE": "0x3333333333333333333333333333333333333333"
            }"#,
        )
        .unwrap();

        // Deploying takes precedence over a configured address
        assert_eq!(resolve_step(&config, ContractName::OptionsToken), Step::Deploy);
        assert_eq!(
            resolve_step(&config, ContractName::ThenaOracle),
            Step::Attach(address!("3333333333333333333333333333333333333333"))
        );
        assert_eq!(resolve_step(&config, ContractName::DiscountExercise), Step::Skip);
        assert_eq!(Step::from_address(None), Step::Skip);
    }

    #[test]
    fn test_unavailable_dependency_is_named() {
        let res = Resolution::Unavailable.require(ContractName::ThenaOracle);
        assert!(matches!(
            res,
            Err(ScriptError::MissingDependency("ThenaOracle"))
        ));

        let addr = address!("3333333333333333333333333333333333333333");
        assert_eq!(
            Resolution::Attached(addr)
                .require(ContractName::ThenaOracle)
                .unwrap(),
            addr
        );
        assert_eq!(Resolution::Deployed(addr).address(), Some(addr));
    }

    #[test]
    fn test_address_from_slot() {
        let addr = address!("1E71AEE6081f62053123140aacC7a06021D77348");
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(addr.as_slice());

        assert_eq!(address_from_slot(U256::from_be_bytes(word)), addr);
        assert_eq!(address_from_slot(U256::ZERO), Address::ZERO);
    }
}
