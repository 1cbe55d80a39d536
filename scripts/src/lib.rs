//! Scripts for deploying and upgrading the options token contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod deploy;
pub mod errors;
pub mod networks;
pub mod solidity;
pub mod types;
pub mod upgrade;
pub mod utils;
pub mod verify;
