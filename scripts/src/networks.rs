//! The networks the contracts are deployed to

use std::fmt::{self, Display};

use clap::ValueEnum;

use crate::constants::{LOCAL_CHAIN_ID, LOCAL_RPC_URL};

/// A target network for deployment
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Network {
    /// Optimism mainnet
    Op,
    /// BNB smart chain
    Bsc,
    /// Mode mainnet
    Mode,
    /// Scroll mainnet
    Scroll,
    /// A local development node
    Local,
}

impl Network {
    /// The default public RPC endpoint of the network
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Op => "https://mainnet.optimism.io",
            Network::Bsc => "https://bsc-dataseed.binance.org/",
            Network::Mode => "https://mainnet.mode.network/",
            Network::Scroll => "https://rpc.scroll.io",
            Network::Local => LOCAL_RPC_URL,
        }
    }

    /// The chain ID of the network
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Op => 10,
            Network::Bsc => 56,
            Network::Mode => 34443,
            Network::Scroll => 534352,
            Network::Local => LOCAL_CHAIN_ID,
        }
    }

    /// Resolve the RPC URL to use, preferring an explicit override
    pub fn rpc_url(&self, rpc_override: Option<&str>) -> String {
        rpc_override
            .unwrap_or(self.default_rpc_url())
            .to_string()
    }

    /// Whether contracts on this network can be verified on a public explorer
    pub fn supports_verification(&self) -> bool {
        !matches!(self, Network::Local)
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Op => write!(f, "op"),
            Network::Bsc => write!(f, "bsc"),
            Network::Mode => write!(f, "mode"),
            Network::Scroll => write!(f, "scroll"),
            Network::Local => write!(f, "local"),
        }
    }
}
