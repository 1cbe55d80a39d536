//! Loading and validation of the JSON deployment configuration

use std::{fs, path::Path, str::FromStr};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Deserializer};

use crate::{
    constants::{DEFAULT_MAX_SWAP_SLIPPAGE_BPS, MAX_BPS},
    errors::ScriptError,
    solidity::SwapProps,
    types::{ContractName, ExchangeType},
};

/// The deployment configuration, read once at start-up
///
/// Every field besides `CONTRACTS_TO_DEPLOY` is optional at parse time; a field
/// becomes required when a deploy step reads it, see [`required`].
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DeployConfig {
    /// The contracts to deploy; every other contract is attached to
    pub contracts_to_deploy: Vec<ContractName>,

    // --- Existing deployments --- //
    /// An existing swapper
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub swapper: Option<Address>,
    /// An existing oracle
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub oracle: Option<Address>,
    /// An existing options token
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub options_token: Option<Address>,
    /// An existing discount exercise contract
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub discount_exercise: Option<Address>,
    /// An existing options compounder
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub options_compounder: Option<Address>,

    // --- Options token --- //
    /// The token paid when exercising an option
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub ot_payment_token: Option<Address>,
    /// The token received when exercising an option
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub ot_underlying_token: Option<Address>,
    /// The ERC20 name of the options token
    #[serde(default)]
    pub ot_name: Option<String>,
    /// The ERC20 symbol of the options token
    #[serde(default)]
    pub ot_symbol: Option<String>,
    /// The account allowed to mint options tokens
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub ot_token_admin: Option<Address>,
    /// The owner of the oracle and exercise contracts
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub owner: Option<Address>,

    // --- Oracle --- //
    /// The pair the oracle reads its TWAP from
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub oracle_source: Option<Address>,
    /// The TWAP window in seconds
    #[serde(default, deserialize_with = "deserialize_opt_u256")]
    pub oracle_secs: Option<U256>,
    /// The minimum price the oracle reports
    #[serde(default, deserialize_with = "deserialize_opt_u256")]
    pub oracle_min_price: Option<U256>,

    // --- Exercise --- //
    /// The price multiplier applied on exercise, in basis points
    #[serde(default, deserialize_with = "deserialize_opt_u256")]
    pub multiplier: Option<U256>,
    /// The fee charged on an instant exit, in basis points
    #[serde(default, deserialize_with = "deserialize_opt_u256")]
    pub instant_exit_fee: Option<U256>,
    /// The accumulated fee amount above which fees are swapped
    #[serde(default, deserialize_with = "deserialize_opt_u256")]
    pub min_amount_to_trigger_swap: Option<U256>,
    /// The recipients of exercise fees
    #[serde(default, deserialize_with = "deserialize_opt_address_list")]
    pub fee_recipients: Option<Vec<Address>>,
    /// The share of exercise fees paid to each recipient, in basis points
    #[serde(default, deserialize_with = "deserialize_opt_u256_list")]
    pub fee_bps: Option<Vec<U256>>,

    // --- Swaps --- //
    /// The router swaps are routed through
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub velo_router: Option<Address>,
    /// The kind of exchange `VELO_ROUTER` is
    #[serde(default)]
    pub exchange_type: Option<ExchangeType>,
    /// The maximum slippage tolerated on swaps, in basis points
    #[serde(default, deserialize_with = "deserialize_opt_u256")]
    pub max_swap_slippage: Option<U256>,
    /// The strategists granted a role on the swapper
    #[serde(default, deserialize_with = "deserialize_opt_address_list")]
    pub strategists: Option<Vec<Address>>,
    /// The multisig roles of the swapper: super admin, admin, guardian
    #[serde(default, deserialize_with = "deserialize_opt_address_list")]
    pub multisig_roles: Option<Vec<Address>>,

    // --- Compounder --- //
    /// The lending pool address provider used for flash loans
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    pub address_provider: Option<Address>,
    /// The strategies allowed to use the compounder
    #[serde(default, deserialize_with = "deserialize_opt_address_list")]
    pub strats: Option<Vec<Address>>,
}

impl DeployConfig {
    /// Read, parse and validate the configuration at the given path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Parse and validate a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        let config: DeployConfig =
            serde_json::from_str(json).map_err(|e| ScriptError::ReadConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants that hold across fields
    fn validate(&self) -> Result<(), ScriptError> {
        if let (Some(recipients), Some(bps)) = (&self.fee_recipients, &self.fee_bps) {
            if recipients.len() != bps.len() {
                return Err(ScriptError::InvalidConfig(format!(
                    "FEE_RECIPIENTS has {} entries but FEE_BPS has {}",
                    recipients.len(),
                    bps.len()
                )));
            }
        }

        if let Some(roles) = &self.multisig_roles {
            if roles.len() != 3 {
                return Err(ScriptError::InvalidConfig(format!(
                    "MULTISIG_ROLES must hold exactly 3 addresses, got {}",
                    roles.len()
                )));
            }
        }

        for bps in self.fee_bps.iter().flatten() {
            check_bps("FEE_BPS", *bps)?;
        }
        if let Some(fee) = self.instant_exit_fee {
            check_bps("INSTANT_EXIT_FEE", fee)?;
        }
        if let Some(slippage) = self.max_swap_slippage {
            check_bps("MAX_SWAP_SLIPPAGE", slippage)?;
        }

        Ok(())
    }

    /// Whether the given contract is listed in `CONTRACTS_TO_DEPLOY`
    pub fn should_deploy(&self, contract: ContractName) -> bool {
        self.contracts_to_deploy.contains(&contract)
    }

    /// The configured address of an existing deployment of the given contract
    pub fn existing_address(&self, contract: ContractName) -> Option<Address> {
        match contract {
            ContractName::Swapper => self.swapper,
            ContractName::ThenaOracle => self.oracle,
            ContractName::OptionsToken => self.options_token,
            ContractName::DiscountExercise => self.discount_exercise,
            ContractName::OptionsCompounder => self.options_compounder,
        }
    }

    /// The swapper's guardian role, the third multisig role
    pub fn guardian(&self) -> Result<Address, ScriptError> {
        Ok(required(&self.multisig_roles, "MULTISIG_ROLES")?[2])
    }

    /// The swapper's super admin role, the first multisig role
    pub fn super_admin(&self) -> Result<Address, ScriptError> {
        Ok(required(&self.multisig_roles, "MULTISIG_ROLES")?[0])
    }

    /// The oracle's TWAP window, which must fit in a `uint56`
    pub fn oracle_secs(&self) -> Result<u64, ScriptError> {
        let secs = required(&self.oracle_secs, "ORACLE_SECS")?;
        u64::try_from(secs)
            .ok()
            .filter(|s| *s < (1 << 56))
            .ok_or_else(|| ScriptError::InvalidConfig("ORACLE_SECS exceeds uint56".to_string()))
    }

    /// The oracle's minimum price, which must fit in a `uint128`
    pub fn oracle_min_price(&self) -> Result<u128, ScriptError> {
        let min_price = required(&self.oracle_min_price, "ORACLE_MIN_PRICE")?;
        u128::try_from(min_price).map_err(|_| {
            ScriptError::InvalidConfig("ORACLE_MIN_PRICE exceeds uint128".to_string())
        })
    }

    /// Build the swap parameters shared by the exercise and compounder contracts
    pub fn swap_props(&self, swapper: Address) -> Result<SwapProps, ScriptError> {
        Ok(SwapProps {
            swapper,
            exchangeAddress: required(&self.velo_router, "VELO_ROUTER")?,
            exchangeTypes: self.exchange_type.unwrap_or_default().into(),
            maxSwapSlippage: self
                .max_swap_slippage
                .unwrap_or(U256::from(DEFAULT_MAX_SWAP_SLIPPAGE_BPS)),
        })
    }
}

/// Unwrap a configuration field that the current step requires
pub fn required<T: Clone>(value: &Option<T>, field: &'static str) -> Result<T, ScriptError> {
    value.clone().ok_or(ScriptError::MissingConfig(field))
}

/// Reject basis-point values above 100%
fn check_bps(field: &str, value: U256) -> Result<(), ScriptError> {
    if value > U256::from(MAX_BPS) {
        return Err(ScriptError::InvalidConfig(format!(
            "{field} value {value} exceeds {MAX_BPS} bps"
        )));
    }
    Ok(())
}

// -------------------
// | Deserialization |
// -------------------

/// A number given either as a JSON number or as a decimal string
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    /// A JSON number
    Number(u64),
    /// A decimal string, for values that overflow a JSON number
    String(String),
}

impl TryFrom<Numeric> for U256 {
    type Error = String;

    fn try_from(value: Numeric) -> Result<Self, Self::Error> {
        match value {
            Numeric::Number(n) => Ok(U256::from(n)),
            Numeric::String(s) => {
                U256::from_str(s.trim()).map_err(|e| format!("invalid number `{s}`: {e}"))
            }
        }
    }
}

/// A list given either as a JSON array or as a single comma-separated string
#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrJoined<T> {
    /// A JSON array
    List(Vec<T>),
    /// A comma-separated string
    Joined(String),
}

/// Split a comma-separated string, dropping empty entries
fn split_joined(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Deserialize an optional address, treating an empty string as unset
fn deserialize_opt_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Address::from_str(s)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid address `{s}`: {e}"))),
    }
}

/// Deserialize an optional number given as a JSON number or a decimal string
fn deserialize_opt_u256<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Numeric> = Option::deserialize(deserializer)?;
    value
        .map(U256::try_from)
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// Deserialize an optional list of addresses, treating a blank string as unset
fn deserialize_opt_address_list<'de, D>(deserializer: D) -> Result<Option<Vec<Address>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<ListOrJoined<String>> = Option::deserialize(deserializer)?;
    let entries = match value {
        None => return Ok(None),
        Some(ListOrJoined::List(list)) => list,
        Some(ListOrJoined::Joined(joined)) if joined.trim().is_empty() => return Ok(None),
        Some(ListOrJoined::Joined(joined)) => split_joined(&joined).map(String::from).collect(),
    };

    entries
        .iter()
        .map(|s| {
            Address::from_str(s.trim())
                .map_err(|e| serde::de::Error::custom(format!("invalid address `{s}`: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Deserialize an optional list of numbers, treating a blank string as unset
fn deserialize_opt_u256_list<'de, D>(deserializer: D) -> Result<Option<Vec<U256>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<ListOrJoined<Numeric>> = Option::deserialize(deserializer)?;
    let entries = match value {
        None => return Ok(None),
        Some(ListOrJoined::List(list)) => list,
        Some(ListOrJoined::Joined(joined)) if joined.trim().is_empty() => return Ok(None),
        Some(ListOrJoined::Joined(joined)) => split_joined(&joined)
            .map(|s| Numeric::String(s.to_string()))
            .collect(),
    };

    entries
        .into_iter()
        .map(U256::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
        .map_err(serde::de::Error::custom)
}
