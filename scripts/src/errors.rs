//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading the deployment configuration file
    ReadConfig(String),
    /// A field required by an active deploy step is absent from the configuration
    MissingConfig(&'static str),
    /// The configuration is present but malformed
    InvalidConfig(String),
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error locating or parsing a compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// The connected node reports a different chain than the selected network
    ChainIdMismatch {
        /// The chain ID of the selected network
        expected: u64,
        /// The chain ID reported by the node
        actual: u64,
    },
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// A contract needed by a later step was neither deployed nor attached
    MissingDependency(&'static str),
    /// The upgrade preflight rejected the upgrade
    UpgradeRejected(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadConfig(s) => write!(f, "error reading config: {}", s),
            ScriptError::MissingConfig(field) => {
                write!(f, "config field `{}` is required but not set", field)
            }
            ScriptError::InvalidConfig(s) => write!(f, "invalid config: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ChainIdMismatch { expected, actual } => write!(
                f,
                "chain id mismatch: network expects {}, node reports {}",
                expected, actual
            ),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::MissingDependency(name) => {
                write!(f, "{} is required but was neither deployed nor attached", name)
            }
            ScriptError::UpgradeRejected(s) => write!(f, "upgrade rejected: {}", s),
        }
    }
}

impl Error for ScriptError {}
