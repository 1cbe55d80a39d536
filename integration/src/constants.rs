//! Constants used in the integration tests

/// The default hostport that a local Anvil node runs on
pub(crate) const DEFAULT_DEVNET_HOSTPORT: &str = "http://127.0.0.1:8545";

/// The default private key, the first default account in an Anvil node
pub(crate) const DEFAULT_DEVNET_PKEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The default directory holding the compiled contract artifacts
pub(crate) const DEFAULT_ARTIFACTS_DIR: &str = "out";

/// The artifact of the options token upgrade target
pub(crate) const OPTIONS_TOKEN_V2_ARTIFACT: &str = "OptionsTokenV2";

/// The name and symbol the test options tokens are initialized with
pub(crate) const TEST_TOKEN_NAME: &str = "TEST";

/// The value `newVar` returns once a proxy is upgraded to V2
pub(crate) const V2_NEW_VAR: u64 = 123456;

/// The amount minted after an upgrade
pub(crate) const MINT_AMOUNT: u64 = 1000;

/// The gas limit of upgrade transactions, set so that they are sent without
/// estimation and land on chain even when they revert
pub(crate) const UPGRADE_GAS_LIMIT: u64 = 1_000_000;
