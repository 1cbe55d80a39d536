//! Implementations of the various deploy scripts

use std::path::PathBuf;

use alloy::primitives::{aliases::U56, Address};
use alloy_sol_types::{SolCall, SolConstructor};
use tracing::{debug, info, warn};

use crate::{
    artifacts::Artifacts,
    cli::{DeployArgs, InitiateUpgradeArgs, PrepareUpgradeArgs, UpgradeArgs, UpgradeStatusArgs},
    config::{required, DeployConfig},
    constants::{IMPLEMENTATION_KEY_SUFFIX, NEXT_IMPLEMENTATION_KEY_SUFFIX, PROXY_ARTIFACT_NAME},
    deploy::{
        attach, deploy_contract, deploy_uups_proxy, implementation_address,
        proxy_constructor_args, resolve_step, ProxyDeployment, Resolution, Step,
    },
    errors::ScriptError,
    solidity::{
        DiscountExercise, OptionsCompounder, OptionsToken, ReaperSwapper, ThenaOracle,
    },
    types::ContractName,
    upgrade::{next_block_timestamp, UpgradeBlocked, UpgradeCooldown},
    utils::{parse_address, read_deployment, send_tx, write_deployed_address, DeployClient},
    verify::Verifier,
};

/// Everything a script needs besides its own arguments
pub struct DeployContext {
    /// The signing client
    pub client: DeployClient,
    /// The compiled contract artifacts
    pub artifacts: Artifacts,
    /// The block explorer verifier
    pub verifier: Verifier,
    /// The file deployed addresses are recorded in, if any
    pub deployments: Option<PathBuf>,
}

impl DeployContext {
    /// Record an address under the given key of the deployments file
    fn record(&self, key: &str, address: Address) -> Result<(), ScriptError> {
        match &self.deployments {
            Some(path) => write_deployed_address(path, key, address),
            None => Ok(()),
        }
    }

    /// Record a proxy deployment, along with the implementation behind it
    fn record_proxy(
        &self,
        contract: ContractName,
        deployment: ProxyDeployment,
    ) -> Result<(), ScriptError> {
        self.record(contract.as_str(), deployment.proxy)?;
        self.record(
            &format!("{}{}", contract, IMPLEMENTATION_KEY_SUFFIX),
            deployment.implementation,
        )
    }

    /// Resolve an address given on the command line, falling back to the
    /// given key of the deployments file
    fn address_or_deployment(
        &self,
        address: Option<&str>,
        key: &str,
    ) -> Result<Address, ScriptError> {
        match (address, &self.deployments) {
            (Some(address), _) => parse_address(address),
            (None, Some(path)) => read_deployment(path, key),
            (None, None) => Err(ScriptError::ReadDeployments(format!(
                "no address given for {key} and no deployments file"
            ))),
        }
    }

    /// The options token proxy an upgrade command acts on
    fn options_token_proxy(&self, proxy: Option<&str>) -> Result<Address, ScriptError> {
        self.address_or_deployment(proxy, ContractName::OptionsToken.as_str())
    }

    /// The implementation an upgrade command proposes or installs
    fn next_implementation(&self, implementation: Option<&str>) -> Result<Address, ScriptError> {
        let key = format!("{}{}", ContractName::OptionsToken, NEXT_IMPLEMENTATION_KEY_SUFFIX);
        self.address_or_deployment(implementation, &key)
    }

    /// Attach to a contract the current run does not deploy
    async fn attach(&self, contract: ContractName, step: Step) -> Resolution {
        let address = match step {
            Step::Attach(address) => Some(address),
            Step::Deploy | Step::Skip => None,
        };
        attach(&self.client, contract, address).await
    }

    /// Deploy a contract from the named artifact
    async fn deploy_artifact(
        &self,
        artifact_name: &str,
        ctor_args: Vec<u8>,
    ) -> Result<Address, ScriptError> {
        let artifact = self.artifacts.load(artifact_name)?;
        deploy_contract(&self.client, &artifact, ctor_args).await
    }
}

/// Deploy the swapper behind a UUPS proxy, or attach to the configured one
pub async fn deploy_swapper(
    args: DeployArgs,
    ctx: &DeployContext,
) -> Result<Resolution, ScriptError> {
    let config = DeployConfig::load(&args.config)?;

    let step = resolve_step(&config, ContractName::Swapper);
    if step != Step::Deploy {
        return Ok(ctx.attach(ContractName::Swapper, step).await);
    }

    let init_calldata = ReaperSwapper::initializeCall {
        strategists: required(&config.strategists, "STRATEGISTS")?,
        guardian: config.guardian()?,
        superAdmin: config.super_admin()?,
    }
    .abi_encode();

    let deployment = deploy_uups_proxy(
        &ctx.client,
        &ctx.artifacts,
        ContractName::Swapper.artifact_name(),
        init_calldata,
    )
    .await?;
    info!("Swapper deployed to: {:#x}", deployment.proxy);
    info!("Implementation: {:#x}", deployment.implementation);
    ctx.record_proxy(ContractName::Swapper, deployment)?;

    Ok(Resolution::Deployed(deployment.proxy))
}

/// Deploy the oracle, options token, exercise and compounder contracts, in
/// that order, attaching to the configured deployment of every contract that
/// is not requested
pub async fn deploy_options_token_infra(
    args: DeployArgs,
    ctx: &DeployContext,
) -> Result<(), ScriptError> {
    let config = DeployConfig::load(&args.config)?;

    let swapper = ctx
        .attach(
            ContractName::Swapper,
            Step::from_address(config.existing_address(ContractName::Swapper)),
        )
        .await;

    let oracle = deploy_oracle(&config, ctx).await?;
    let options_token = deploy_options_token(&config, ctx).await?;
    deploy_exercise(&config, ctx, swapper, oracle, options_token).await?;
    deploy_compounder(&config, ctx, swapper, oracle, options_token).await?;

    Ok(())
}

/// Deploy the TWAP oracle, or attach to the configured one
async fn deploy_oracle(
    config: &DeployConfig,
    ctx: &DeployContext,
) -> Result<Resolution, ScriptError> {
    let contract = ContractName::ThenaOracle;
    let step = resolve_step(config, contract);
    if step != Step::Deploy {
        return Ok(ctx.attach(contract, step).await);
    }

    let ctor_args = ThenaOracle::constructorCall {
        thenaPair: required(&config.oracle_source, "ORACLE_SOURCE")?,
        token: required(&config.ot_underlying_token, "OT_UNDERLYING_TOKEN")?,
        owner: required(&config.owner, "OWNER")?,
        secs: U56::from(config.oracle_secs()?),
        minPrice: config.oracle_min_price()?,
    }
    .abi_encode();

    let oracle = ctx.deploy_artifact(contract.artifact_name(), ctor_args.clone()).await?;
    info!("Oracle deployed to: {oracle:#x}");
    ctx.record(contract.as_str(), oracle)?;
    ctx.verifier.verify(oracle, contract.artifact_name(), &ctor_args);

    Ok(Resolution::Deployed(oracle))
}

/// Deploy the options token behind a UUPS proxy, or attach to the configured one
async fn deploy_options_token(
    config: &DeployConfig,
    ctx: &DeployContext,
) -> Result<Resolution, ScriptError> {
    let contract = ContractName::OptionsToken;
    let step = resolve_step(config, contract);
    if step != Step::Deploy {
        return Ok(ctx.attach(contract, step).await);
    }

    let init_calldata = OptionsToken::initializeCall {
        name: required(&config.ot_name, "OT_NAME")?,
        symbol: required(&config.ot_symbol, "OT_SYMBOL")?,
        tokenAdmin: required(&config.ot_token_admin, "OT_TOKEN_ADMIN")?,
    }
    .abi_encode();

    let deployment = deploy_uups_proxy(
        &ctx.client,
        &ctx.artifacts,
        contract.artifact_name(),
        init_calldata,
    )
    .await?;
    info!("OptionsToken deployed to: {:#x}", deployment.proxy);
    info!("Implementation: {:#x}", deployment.implementation);
    ctx.record_proxy(contract, deployment)?;

    Ok(Resolution::Deployed(deployment.proxy))
}

/// Deploy the discount exercise contract and register it with the options
/// token, or attach to the configured one
async fn deploy_exercise(
    config: &DeployConfig,
    ctx: &DeployContext,
    swapper: Resolution,
    oracle: Resolution,
    options_token: Resolution,
) -> Result<Resolution, ScriptError> {
    let contract = ContractName::DiscountExercise;
    let step = resolve_step(config, contract);
    if step != Step::Deploy {
        return Ok(ctx.attach(contract, step).await);
    }

    let options_token = options_token.require(ContractName::OptionsToken)?;
    let ctor_args = exercise_constructor_args(
        config,
        options_token,
        oracle.require(ContractName::ThenaOracle)?,
        swapper.require(ContractName::Swapper)?,
    )?;

    let exercise = ctx.deploy_artifact(contract.artifact_name(), ctor_args.clone()).await?;
    info!("Exercise deployed to: {exercise:#x}");
    ctx.record(contract.as_str(), exercise)?;
    ctx.verifier.verify(exercise, contract.artifact_name(), &ctor_args);

    let token = OptionsToken::new(options_token, &ctx.client);
    send_tx(token.setExerciseContract(exercise, true)).await?;
    info!("Exercise set to: {exercise:#x}");

    Ok(Resolution::Deployed(exercise))
}

/// The constructor arguments of the discount exercise contract
pub fn exercise_constructor_args(
    config: &DeployConfig,
    options_token: Address,
    oracle: Address,
    swapper: Address,
) -> Result<Vec<u8>, ScriptError> {
    Ok(DiscountExercise::constructorCall {
        oToken: options_token,
        owner: required(&config.owner, "OWNER")?,
        paymentToken: required(&config.ot_payment_token, "OT_PAYMENT_TOKEN")?,
        underlyingToken: required(&config.ot_underlying_token, "OT_UNDERLYING_TOKEN")?,
        oracle,
        multiplier: required(&config.multiplier, "MULTIPLIER")?,
        instantExitFee: required(&config.instant_exit_fee, "INSTANT_EXIT_FEE")?,
        minAmountToTriggerSwap: required(
            &config.min_amount_to_trigger_swap,
            "MIN_AMOUNT_TO_TRIGGER_SWAP",
        )?,
        feeRecipients: required(&config.fee_recipients, "FEE_RECIPIENTS")?,
        feeBPS: required(&config.fee_bps, "FEE_BPS")?,
        swapProps: config.swap_props(swapper)?,
    }
    .abi_encode())
}

/// The `initialize` calldata of the options compounder
pub fn compounder_initializer(
    config: &DeployConfig,
    options_token: Address,
    oracle: Address,
    swapper: Address,
) -> Result<Vec<u8>, ScriptError> {
    Ok(OptionsCompounder::initializeCall {
        optionsToken: options_token,
        addressProvider: required(&config.address_provider, "ADDRESS_PROVIDER")?,
        swapProps: config.swap_props(swapper)?,
        oracle,
        strats: required(&config.strats, "STRATS")?,
    }
    .abi_encode())
}

/// Deploy the options compounder behind a UUPS proxy, or attach to the
/// configured one and update its strategies
async fn deploy_compounder(
    config: &DeployConfig,
    ctx: &DeployContext,
    swapper: Resolution,
    oracle: Resolution,
    options_token: Resolution,
) -> Result<Resolution, ScriptError> {
    let contract = ContractName::OptionsCompounder;
    let step = resolve_step(config, contract);
    if step != Step::Deploy {
        let compounder = ctx.attach(contract, step).await;
        if let (Resolution::Attached(address), Some(strats)) = (compounder, &config.strats) {
            let compounder_contract = OptionsCompounder::new(address, &ctx.client);
            match send_tx(compounder_contract.setStrats(strats.clone())).await {
                Ok(_) => info!("OptionsCompounder strategies set to: {strats:?}"),
                Err(e) => warn!("Failed to set OptionsCompounder strategies: {e}"),
            }
        }
        return Ok(compounder);
    }

    let options_token = options_token.require(ContractName::OptionsToken)?;
    let oracle = oracle.require(ContractName::ThenaOracle)?;
    debug!(
        "Proxy deployment: options token {options_token:#x}, address provider {:?}, \
         oracle {oracle:#x}, strats {:?}",
        config.address_provider, config.strats
    );

    let init_calldata = compounder_initializer(
        config,
        options_token,
        oracle,
        swapper.require(ContractName::Swapper)?,
    )?;

    let deployment = deploy_uups_proxy(
        &ctx.client,
        &ctx.artifacts,
        contract.artifact_name(),
        init_calldata.clone(),
    )
    .await?;
    info!("OptionsCompounder deployed to: {:#x}", deployment.proxy);
    info!("Implementation: {:#x}", deployment.implementation);
    ctx.record_proxy(contract, deployment)?;

    let proxy_args = proxy_constructor_args(deployment.implementation, init_calldata);
    ctx.verifier
        .verify(deployment.implementation, contract.artifact_name(), &[]);
    ctx.verifier
        .verify(deployment.proxy, PROXY_ARTIFACT_NAME, &proxy_args);

    Ok(Resolution::Deployed(deployment.proxy))
}

/// Deploy a new implementation of an upgradeable contract, to be proposed
/// through `initiate-upgrade`
pub async fn prepare_upgrade(
    args: PrepareUpgradeArgs,
    ctx: &DeployContext,
) -> Result<(), ScriptError> {
    if !args.contract.is_upgradeable() {
        return Err(ScriptError::InvalidConfig(format!(
            "{} is not deployed behind a proxy",
            args.contract
        )));
    }

    let artifact_name = args
        .artifact
        .as_deref()
        .unwrap_or(args.contract.artifact_name());
    let implementation = ctx.deploy_artifact(artifact_name, vec![]).await?;
    info!(
        "{} implementation ({artifact_name}) deployed to: {implementation:#x}",
        args.contract
    );
    ctx.record(
        &format!("{}{}", args.contract, NEXT_IMPLEMENTATION_KEY_SUFFIX),
        implementation,
    )?;
    ctx.verifier.verify(implementation, artifact_name, &[]);

    Ok(())
}

/// Start the upgrade cooldown of an options token proxy
pub async fn initiate_upgrade(
    args: InitiateUpgradeArgs,
    ctx: &DeployContext,
) -> Result<(), ScriptError> {
    let proxy = ctx.options_token_proxy(args.proxy.as_deref())?;
    let implementation = ctx.next_implementation(args.implementation.as_deref())?;

    let token = OptionsToken::new(proxy, &ctx.client);
    send_tx(token.initiateUpgradeCooldown(implementation)).await?;

    let cooldown = UpgradeCooldown::fetch(&ctx.client, proxy).await?;
    info!(
        "Upgrade cooldown initiated at {} for {:#x}",
        cooldown.proposal_time, cooldown.next_implementation
    );
    info!("Upgrade allowed from timestamp {}", cooldown.ready_at());

    Ok(())
}

/// Report the upgrade cooldown state of an options token proxy
pub async fn upgrade_status(
    args: UpgradeStatusArgs,
    ctx: &DeployContext,
) -> Result<(), ScriptError> {
    let proxy = ctx.options_token_proxy(args.proxy.as_deref())?;
    let cooldown = UpgradeCooldown::fetch(&ctx.client, proxy).await?;
    let current = implementation_address(&ctx.client, proxy).await?;
    let now = next_block_timestamp(&ctx.client).await?;

    info!("Current implementation: {current:#x}");
    info!(
        "Proposed implementation: {:#x}",
        cooldown.next_implementation
    );
    info!(
        "Proposal time: {}, timelock: {}s",
        cooldown.proposal_time, cooldown.timelock
    );

    let target = match args.implementation {
        Some(implementation) => parse_address(&implementation)?,
        None => cooldown.next_implementation,
    };
    match cooldown.check(now, target) {
        Ok(()) => info!("Upgrade to {target:#x} is allowed"),
        Err(blocked @ UpgradeBlocked::CooldownPending { ready_at }) => {
            warn!("Upgrade to {target:#x} is blocked: {blocked}");
            info!("Upgrade allowed from timestamp {ready_at}, next block at {now}");
        }
        Err(blocked @ UpgradeBlocked::IncorrectImplementation { expected }) => {
            warn!("Upgrade to {target:#x} is blocked: {blocked}, expected {expected:#x}");
        }
    }

    Ok(())
}

/// Upgrade an options token proxy to the implementation its cooldown was
/// initiated for
pub async fn upgrade(args: UpgradeArgs, ctx: &DeployContext) -> Result<(), ScriptError> {
    let proxy = ctx.options_token_proxy(args.proxy.as_deref())?;
    let implementation = ctx.next_implementation(args.implementation.as_deref())?;

    if args.force {
        warn!("Skipping the upgrade cooldown preflight");
    } else {
        let cooldown = UpgradeCooldown::fetch(&ctx.client, proxy).await?;
        let now = next_block_timestamp(&ctx.client).await?;
        cooldown
            .check(now, implementation)
            .map_err(|blocked| ScriptError::UpgradeRejected(blocked.to_string()))?;
    }

    let previous = implementation_address(&ctx.client, proxy).await?;
    let token = OptionsToken::new(proxy, &ctx.client);
    send_tx(token.upgradeTo(implementation)).await?;
    let current = implementation_address(&ctx.client, proxy).await?;

    info!("Upgraded {proxy:#x} from {previous:#x} to {current:#x}");
    ctx.record(
        &format!("{}{}", ContractName::OptionsToken, IMPLEMENTATION_KEY_SUFFIX),
        current,
    )
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Address, U256};
    use alloy_sol_types::{SolCall, SolValue};

    use super::{compounder_initializer, exercise_constructor_args};
    use crate::{
        config::DeployConfig,
        errors::ScriptError,
        solidity::{OptionsCompounder, SwapProps},
    };

    /// The decoded constructor arguments of the discount exercise contract
    type ExerciseArgs = (
        Address,
        Address,
        Address,
        Address,
        Address,
        U256,
        U256,
        U256,
        Vec<Address>,
        Vec<U256>,
        SwapProps,
    );

    const OPTIONS_TOKEN: Address = address!("2222222222222222222222222222222222222222");
    const ORACLE: Address = address!("6666666666666666666666666666666666666666");
    const SWAPPER: Address = address!("1111111111111111111111111111111111111111");

    const CONFIG: &str = r#"{
        "CONTRACTS_TO_DEPLOY": ["DiscountExercise", "OptionsCompounder"],
        "OT_PAYMENT_TOKEN": "0x3333333333333333333333333333333333333333",
        "OT_UNDERLYING_TOKEN": "0x4444444444444444444444444444444444444444",
        "OWNER": "0x5555555555555555555555555555555555555555",
        "VELO_ROUTER": "0x7777777777777777777777777777777777777777",
        "MULTIPLIER": 5000,
        "INSTANT_EXIT_FEE": 1000,
        "MIN_AMOUNT_TO_TRIGGER_SWAP": "1000000000000000",
        "FEE_RECIPIENTS": "0x8888888888888888888888888888888888888888,0x9999999999999999999999999999999999999999",
        "FEE_BPS": "3000,7000",
        "ADDRESS_PROVIDER": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        "STRATS": ["0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"]
    }"#;

    /// The swap parameters both contracts are expected to receive
    fn expected_swap_props() -> SwapProps {
        SwapProps {
            swapper: SWAPPER,
            exchangeAddress: address!("7777777777777777777777777777777777777777"),
            exchangeTypes: 2,
            maxSwapSlippage: U256::from(500),
        }
    }

    #[test]
    fn test_exercise_constructor_args() {
        let config = DeployConfig::from_json(CONFIG).unwrap();
        let encoded = exercise_constructor_args(&config, OPTIONS_TOKEN, ORACLE, SWAPPER).unwrap();

        let (
            o_token,
            owner,
            payment_token,
            underlying_token,
            oracle,
            multiplier,
            instant_exit_fee,
            min_amount_to_trigger_swap,
            fee_recipients,
            fee_bps,
            swap_props,
        ) = ExerciseArgs::abi_decode_params(&encoded).unwrap();

        assert_eq!(o_token, OPTIONS_TOKEN);
        assert_eq!(owner, address!("5555555555555555555555555555555555555555"));
        assert_eq!(payment_token, address!("3333333333333333333333333333333333333333"));
        assert_eq!(underlying_token, address!("4444444444444444444444444444444444444444"));
        assert_eq!(oracle, ORACLE);
        assert_eq!(multiplier, U256::from(5000));
        assert_eq!(instant_exit_fee, U256::from(1000));
        assert_eq!(min_amount_to_trigger_swap, U256::from(1_000_000_000_000_000u64));
        assert_eq!(
            fee_recipients,
            vec![
                address!("8888888888888888888888888888888888888888"),
                address!("9999999999999999999999999999999999999999"),
            ]
        );
        assert_eq!(fee_bps, vec![U256::from(3000), U256::from(7000)]);
        assert_eq!(swap_props, expected_swap_props());
    }

    #[test]
    fn test_exercise_constructor_args_require_fees() {
        let mut config = DeployConfig::from_json(CONFIG).unwrap();
        config.fee_bps = None;

        let res = exercise_constructor_args(&config, OPTIONS_TOKEN, ORACLE, SWAPPER);
        assert!(matches!(res, Err(ScriptError::MissingConfig("FEE_BPS"))));
    }

    #[test]
    fn test_compounder_initializer() {
        let config = DeployConfig::from_json(CONFIG).unwrap();
        let encoded = compounder_initializer(&config, OPTIONS_TOKEN, ORACLE, SWAPPER).unwrap();
        assert_eq!(encoded[..4], OptionsCompounder::initializeCall::SELECTOR);

        let call = OptionsCompounder::initializeCall::abi_decode(&encoded).unwrap();
        assert_eq!(call.optionsToken, OPTIONS_TOKEN);
        assert_eq!(
            call.addressProvider,
            address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")
        );
        assert_eq!(call.swapProps, expected_swap_props());
        assert_eq!(call.oracle, ORACLE);
        assert_eq!(
            call.strats,
            vec![address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")]
        );
    }

    #[test]
    fn test_compounder_initializer_requires_strats() {
        let config = DeployConfig::from_json(
            r#"{
                "CONTRACTS_TO_DEPLOY": ["OptionsCompounder"],
                "VELO_ROUTER": "0x7777777777777777777777777777777777777777",
                "ADDRESS_PROVIDER": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                "STRATS": ""
            }"#,
        )
        .unwrap();

        let res = compounder_initializer(&config, OPTIONS_TOKEN, ORACLE, SWAPPER);
        assert!(matches!(res, Err(ScriptError::MissingConfig("STRATS"))));
    }
}
