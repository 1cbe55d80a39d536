//! Preflight of the options token's upgrade cooldown
//!
//! The token only authorizes `upgradeTo` once a cooldown, initiated for a
//! specific implementation, has fully elapsed. The same two conditions are
//! checked here, in the same order, from the token's public state so that an
//! operator learns why an upgrade would revert before sending it.

use std::fmt::{self, Display};

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, U256},
    providers::Provider,
};

use crate::{errors::ScriptError, solidity::OptionsToken, utils::DeployClient};

/// The revert reason of an upgrade attempted during the cooldown
pub const COOLDOWN_PENDING_REASON: &str = "Upgrade cooldown not initiated or still ongoing";

/// The revert reason of an upgrade to an implementation other than the proposed one
pub const INCORRECT_IMPLEMENTATION_REASON: &str = "Incorrect implementation";

/// The upgrade cooldown state of a proxy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeCooldown {
    /// When the cooldown was initiated
    pub proposal_time: U256,
    /// The implementation the cooldown was initiated for
    pub next_implementation: Address,
    /// The length of the cooldown in seconds
    pub timelock: U256,
}

/// Why an upgrade is not currently allowed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeBlocked {
    /// The cooldown was never initiated or has not elapsed
    CooldownPending {
        /// The first timestamp at which the upgrade is allowed
        ready_at: U256,
    },
    /// The target differs from the implementation the cooldown was initiated for
    IncorrectImplementation {
        /// The implementation the cooldown was initiated for
        expected: Address,
    },
}

impl Display for UpgradeBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeBlocked::CooldownPending { .. } => write!(f, "{COOLDOWN_PENDING_REASON}"),
            UpgradeBlocked::IncorrectImplementation { .. } => {
                write!(f, "{INCORRECT_IMPLEMENTATION_REASON}")
            }
        }
    }
}

impl UpgradeCooldown {
    /// Read the cooldown state from a deployed options token proxy
    pub async fn fetch(client: &DeployClient, proxy: Address) -> Result<Self, ScriptError> {
        let token = OptionsToken::new(proxy, client);
        let proposal_time = token
            .upgradeProposalTime()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        let next_implementation = token
            .nextImplementation()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        let timelock = token
            .UPGRADE_TIMELOCK()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(Self {
            proposal_time,
            next_implementation,
            timelock,
        })
    }

    /// The first block timestamp at which an upgrade is allowed
    ///
    /// The cooldown must be strictly exceeded, hence the extra second. A
    /// cleared cooldown is pushed far into the future, so this saturates.
    pub fn ready_at(&self) -> U256 {
        self.proposal_time
            .saturating_add(self.timelock)
            .saturating_add(U256::from(1))
    }

    /// Check whether upgrading to `target` in a block with timestamp `now` is allowed
    pub fn check(&self, now: U256, target: Address) -> Result<(), UpgradeBlocked> {
        if now < self.ready_at() {
            return Err(UpgradeBlocked::CooldownPending {
                ready_at: self.ready_at(),
            });
        }

        if target != self.next_implementation {
            return Err(UpgradeBlocked::IncorrectImplementation {
                expected: self.next_implementation,
            });
        }

        Ok(())
    }
}

/// The timestamp the next block will carry at the earliest
pub async fn next_block_timestamp(client: &DeployClient) -> Result<U256, ScriptError> {
    let block = client
        .get_block_by_number(BlockNumberOrTag::Latest)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .ok_or_else(|| ScriptError::ContractInteraction("latest block not found".to_string()))?;

    Ok(U256::from(block.header.timestamp) + U256::from(1))
}
