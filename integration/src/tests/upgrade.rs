//! Integration tests for the options token upgrade cooldown

use alloy::primitives::{Address, U256};
use eyre::{ensure, Result};
use scripts::{
    deploy::implementation_address,
    solidity::OptionsToken,
    upgrade::{UpgradeBlocked, COOLDOWN_PENDING_REASON, INCORRECT_IMPLEMENTATION_REASON},
    utils::send_tx,
};

use crate::{
    abis::OptionsTokenV2,
    constants::{MINT_AMOUNT, V2_NEW_VAR},
    integration_test,
    test_inventory::TestArgs,
    utils::{
        balance_of, cooldown_timestamp, deploy_options_token, deploy_v2_implementation,
        initiate_cooldown, timelock_secs, upgrade_at, upgrade_revert_reason,
    },
};

/// Test that a proxy upgrades once the cooldown has fully elapsed, and keeps
/// working as a token afterwards
async fn test_upgrade_after_cooldown(args: TestArgs) -> Result<()> {
    let proxy = deploy_options_token(&args, args.signer_address).await?;
    let v2 = deploy_v2_implementation(&args).await?;

    let cooldown = initiate_cooldown(&args, proxy, v2).await?;
    let upgrade_time = cooldown_timestamp(&cooldown, timelock_secs(&cooldown)? + 1)?;
    ensure!(
        cooldown.check(U256::from(upgrade_time), v2).is_ok(),
        "preflight rejected an upgrade after the cooldown"
    );

    let receipt = upgrade_at(&args, proxy, v2, upgrade_time).await?;
    ensure!(receipt.status(), "upgrade after the cooldown reverted");
    ensure!(
        implementation_address(&args.client, proxy).await? == v2,
        "proxy does not point at the new implementation"
    );

    let new_var = OptionsTokenV2::new(proxy, &args.client).newVar().call().await?;
    ensure!(
        new_var == U256::from(V2_NEW_VAR),
        "expected newVar {V2_NEW_VAR}, got {new_var}"
    );

    let token = OptionsToken::new(proxy, &args.client);
    send_tx(token.mint(args.signer_address, U256::from(MINT_AMOUNT))).await?;
    let balance = balance_of(&args, proxy, args.signer_address).await?;
    ensure!(
        balance == U256::from(MINT_AMOUNT),
        "expected balance {MINT_AMOUNT}, got {balance}"
    );

    Ok(())
}
integration_test!(test_upgrade_after_cooldown);

/// Test that an upgrade in the last second of the cooldown reverts
async fn test_upgrade_before_cooldown_reverts(args: TestArgs) -> Result<()> {
    let proxy = deploy_options_token(&args, Address::ZERO).await?;
    let v2 = deploy_v2_implementation(&args).await?;
    let original = implementation_address(&args.client, proxy).await?;

    let cooldown = initiate_cooldown(&args, proxy, v2).await?;
    let upgrade_time = cooldown_timestamp(&cooldown, timelock_secs(&cooldown)?)?;
    ensure!(
        matches!(
            cooldown.check(U256::from(upgrade_time), v2),
            Err(UpgradeBlocked::CooldownPending { .. })
        ),
        "preflight allowed an upgrade during the cooldown"
    );

    let receipt = upgrade_at(&args, proxy, v2, upgrade_time).await?;
    ensure!(!receipt.status(), "upgrade during the cooldown succeeded");

    let reason = upgrade_revert_reason(&args, proxy, v2, &receipt).await?;
    ensure!(
        reason.as_deref() == Some(COOLDOWN_PENDING_REASON),
        "unexpected revert reason: {reason:?}"
    );
    ensure!(
        implementation_address(&args.client, proxy).await? == original,
        "proxy implementation changed after a reverted upgrade"
    );

    Ok(())
}
integration_test!(test_upgrade_before_cooldown_reverts);

/// Test that an upgrade to an implementation other than the proposed one
/// reverts, even once the cooldown has elapsed
async fn test_upgrade_wrong_implementation_reverts(args: TestArgs) -> Result<()> {
    let proxy = deploy_options_token(&args, Address::ZERO).await?;
    let v2 = deploy_v2_implementation(&args).await?;

    let cooldown = initiate_cooldown(&args, proxy, Address::ZERO).await?;
    let upgrade_time = cooldown_timestamp(&cooldown, timelock_secs(&cooldown)? + 1)?;
    ensure!(
        matches!(
            cooldown.check(U256::from(upgrade_time), v2),
            Err(UpgradeBlocked::IncorrectImplementation { expected }) if expected == Address::ZERO
        ),
        "preflight allowed an upgrade to an unproposed implementation"
    );

    let receipt = upgrade_at(&args, proxy, v2, upgrade_time).await?;
    ensure!(!receipt.status(), "upgrade to an unproposed implementation succeeded");

    let reason = upgrade_revert_reason(&args, proxy, v2, &receipt).await?;
    ensure!(
        reason.as_deref() == Some(INCORRECT_IMPLEMENTATION_REASON),
        "unexpected revert reason: {reason:?}"
    );

    Ok(())
}
integration_test!(test_upgrade_wrong_implementation_reverts);
