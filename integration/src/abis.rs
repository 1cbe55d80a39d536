//! Solidity ABI definitions of contracts used in integration testing
#![allow(missing_docs)]

use alloy::sol;

sol! {
    #[sol(rpc)]
    contract OptionsTokenV2 {
        function newVar() external view returns (uint256);
    }
}
