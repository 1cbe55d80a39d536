//! Utilities for the integration tests

use alloy::{
    eips::BlockId,
    primitives::{Address, U256},
    providers::ext::AnvilApi,
    rpc::types::TransactionReceipt,
};
use alloy_sol_types::SolCall;
use eyre::{eyre, Result};
use scripts::{
    deploy::{deploy_contract, deploy_uups_proxy},
    solidity::OptionsToken,
    types::ContractName,
    upgrade::UpgradeCooldown,
    utils::{revert_reason, send_tx},
};

use crate::{
    constants::{OPTIONS_TOKEN_V2_ARTIFACT, TEST_TOKEN_NAME, UPGRADE_GAS_LIMIT},
    test_inventory::TestArgs,
};

/// Deploy an options token behind a UUPS proxy, returning the proxy address
pub(crate) async fn deploy_options_token(args: &TestArgs, token_admin: Address) -> Result<Address> {
    let init_calldata = OptionsToken::initializeCall {
        name: TEST_TOKEN_NAME.to_string(),
        symbol: TEST_TOKEN_NAME.to_string(),
        tokenAdmin: token_admin,
    }
    .abi_encode();

    let deployment = deploy_uups_proxy(
        &args.client,
        &args.artifacts,
        ContractName::OptionsToken.artifact_name(),
        init_calldata,
    )
    .await?;

    Ok(deployment.proxy)
}

/// Deploy the V2 options token implementation
pub(crate) async fn deploy_v2_implementation(args: &TestArgs) -> Result<Address> {
    let artifact = args.artifacts.load(OPTIONS_TOKEN_V2_ARTIFACT)?;
    let implementation = deploy_contract(&args.client, &artifact, vec![]).await?;
    Ok(implementation)
}

/// Initiate the upgrade cooldown for the given implementation, returning
/// the cooldown state it leaves on the proxy
pub(crate) async fn initiate_cooldown(
    args: &TestArgs,
    proxy: Address,
    implementation: Address,
) -> Result<UpgradeCooldown> {
    let token = OptionsToken::new(proxy, &args.client);
    send_tx(token.initiateUpgradeCooldown(implementation)).await?;

    let cooldown = UpgradeCooldown::fetch(&args.client, proxy).await?;
    Ok(cooldown)
}

/// The timestamp lying `offset` seconds after the start of the cooldown
pub(crate) fn cooldown_timestamp(cooldown: &UpgradeCooldown, offset: u64) -> Result<u64> {
    let proposal_time = u64::try_from(cooldown.proposal_time)
        .map_err(|_| eyre!("proposal time {} exceeds u64", cooldown.proposal_time))?;
    Ok(proposal_time + offset)
}

/// The length of the cooldown in seconds
pub(crate) fn timelock_secs(cooldown: &UpgradeCooldown) -> Result<u64> {
    u64::try_from(cooldown.timelock)
        .map_err(|_| eyre!("timelock {} exceeds u64", cooldown.timelock))
}

/// Send `upgradeTo(implementation)` in a block with the given timestamp
///
/// The receipt is returned whether or not the upgrade reverted.
pub(crate) async fn upgrade_at(
    args: &TestArgs,
    proxy: Address,
    implementation: Address,
    timestamp: u64,
) -> Result<TransactionReceipt> {
    args.client.anvil_set_next_block_timestamp(timestamp).await?;

    let token = OptionsToken::new(proxy, &args.client);
    let receipt = token
        .upgradeTo(implementation)
        .gas(UPGRADE_GAS_LIMIT)
        .send()
        .await?
        .get_receipt()
        .await?;

    Ok(receipt)
}

/// Replay `upgradeTo(implementation)` against the block an upgrade landed
/// in, returning the revert reason if it reverts
pub(crate) async fn upgrade_revert_reason(
    args: &TestArgs,
    proxy: Address,
    implementation: Address,
    receipt: &TransactionReceipt,
) -> Result<Option<String>> {
    let block_number = receipt
        .block_number
        .ok_or_else(|| eyre!("upgrade receipt has no block number"))?;

    let token = OptionsToken::new(proxy, &args.client);
    let res = token
        .upgradeTo(implementation)
        .gas(UPGRADE_GAS_LIMIT)
        .block(BlockId::number(block_number))
        .call()
        .await;

    match res {
        Ok(_) => Ok(None),
        Err(e) => Ok(Some(revert_reason(&e).unwrap_or_else(|| e.to_string()))),
    }
}

/// The options token balance of the given account
pub(crate) async fn balance_of(args: &TestArgs, proxy: Address, account: Address) -> Result<U256> {
    let token = OptionsToken::new(proxy, &args.client);
    let balance = token.balanceOf(account).call().await?;
    Ok(balance)
}
