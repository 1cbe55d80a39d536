//! Constants used in the deploy scripts

/// The number of confirmations to wait for a deployment transaction
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The storage slot containing the implementation address in an upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const PROXY_IMPLEMENTATION_STORAGE_SLOT: &str =
    "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The upper bound on any basis-point value in the configuration
pub const MAX_BPS: u64 = 10_000;

/// The default maximum swap slippage, in basis points (5%)
pub const DEFAULT_MAX_SWAP_SLIPPAGE_BPS: u64 = 500;

/// The name of the proxy artifact used for UUPS deployments
pub const PROXY_ARTIFACT_NAME: &str = "ERC1967Proxy";

/// The default directory in which compiled artifacts are found
pub const DEFAULT_ARTIFACTS_DIR: &str = "out";

/// The default path of the deployment configuration file
pub const DEFAULT_CONFIG_PATH: &str = "scripts/config.json";

/// The suffix appended to a contract's key in the deployments file
/// to record the implementation behind its proxy
pub const IMPLEMENTATION_KEY_SUFFIX: &str = "Implementation";

/// The suffix appended to a contract's key in the deployments file
/// to record an implementation prepared for an upgrade
pub const NEXT_IMPLEMENTATION_KEY_SUFFIX: &str = "NextImplementation";

// --- Config keys --- //

/// The address of an existing swapper
pub const SWAPPER_KEY: &str = "SWAPPER";
/// The address of an existing oracle
pub const ORACLE_KEY: &str = "ORACLE";
/// The address of an existing options token
pub const OPTIONS_TOKEN_KEY: &str = "OPTIONS_TOKEN";
/// The address of an existing discount exercise contract
pub const DISCOUNT_EXERCISE_KEY: &str = "DISCOUNT_EXERCISE";
/// The address of an existing options compounder
pub const OPTIONS_COMPOUNDER_KEY: &str = "OPTIONS_COMPOUNDER";

// --- Compiler settings --- //

/// The solc version the contracts are compiled with
pub const SOLC_VERSION: &str = "0.8.23";

/// The number of optimizer runs the contracts are compiled with
pub const OPTIMIZER_RUNS: u32 = 200;

// --- Verification --- //

/// The name of the Foundry command used for verification
pub const FORGE_COMMAND: &str = "forge";

/// The verification subcommand of `forge`
pub const VERIFY_CONTRACT_COMMAND: &str = "verify-contract";

/// The Etherscan verifier backend
pub const ETHERSCAN_VERIFIER: &str = "etherscan";

/// The Sourcify verifier backend
pub const SOURCIFY_VERIFIER: &str = "sourcify";

// --- Local devnet --- //

/// The chain ID of a local Anvil / Hardhat node
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// The default RPC URL of a local node
pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";
