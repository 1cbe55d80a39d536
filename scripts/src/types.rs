//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use clap::ValueEnum;
use serde::Deserialize;

use crate::constants::{
    DISCOUNT_EXERCISE_KEY, OPTIONS_COMPOUNDER_KEY, OPTIONS_TOKEN_KEY, ORACLE_KEY, SWAPPER_KEY,
};

/// The contracts managed by the deploy scripts, named as they appear in the
/// `CONTRACTS_TO_DEPLOY` list of the configuration
#[derive(ValueEnum, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContractName {
    /// The swapper, deployed behind a UUPS proxy
    #[value(name = "Swapper")]
    Swapper,
    /// The TWAP oracle reading from a Thena pair
    #[value(name = "ThenaOracle")]
    ThenaOracle,
    /// The options token, deployed behind a UUPS proxy
    #[value(name = "OptionsToken")]
    OptionsToken,
    /// The discount exercise contract
    #[value(name = "DiscountExercise")]
    DiscountExercise,
    /// The options compounder, deployed behind a UUPS proxy
    #[value(name = "OptionsCompounder")]
    OptionsCompounder,
}

impl ContractName {
    /// The name used for the contract in the configuration and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractName::Swapper => "Swapper",
            ContractName::ThenaOracle => "ThenaOracle",
            ContractName::OptionsToken => "OptionsToken",
            ContractName::DiscountExercise => "DiscountExercise",
            ContractName::OptionsCompounder => "OptionsCompounder",
        }
    }

    /// The name of the compiled artifact for this contract
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractName::Swapper => "ReaperSwapper",
            ContractName::ThenaOracle => "ThenaOracle",
            ContractName::OptionsToken => "OptionsToken",
            ContractName::DiscountExercise => "DiscountExercise",
            ContractName::OptionsCompounder => "OptionsCompounder",
        }
    }

    /// The configuration key holding the address of an existing deployment
    pub fn config_key(&self) -> &'static str {
        match self {
            ContractName::Swapper => SWAPPER_KEY,
            ContractName::ThenaOracle => ORACLE_KEY,
            ContractName::OptionsToken => OPTIONS_TOKEN_KEY,
            ContractName::DiscountExercise => DISCOUNT_EXERCISE_KEY,
            ContractName::OptionsCompounder => OPTIONS_COMPOUNDER_KEY,
        }
    }

    /// Whether the contract is deployed behind a UUPS proxy
    pub fn is_upgradeable(&self) -> bool {
        matches!(
            self,
            ContractName::Swapper | ContractName::OptionsToken | ContractName::OptionsCompounder
        )
    }
}

impl Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The exchange a swapper routes through, mirroring the swapper's `ExchangeType` enum
#[derive(Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ExchangeType {
    /// A Uniswap V2 style router
    UniV2,
    /// A Balancer vault
    Bal,
    /// A Velodrome / Solidly style router
    #[default]
    VeloSolid,
    /// A Uniswap V3 style router
    UniV3,
}

impl From<ExchangeType> for u8 {
    fn from(exchange: ExchangeType) -> u8 {
        match exchange {
            ExchangeType::UniV2 => 0,
            ExchangeType::Bal => 1,
            ExchangeType::VeloSolid => 2,
            ExchangeType::UniV3 => 3,
        }
    }
}
