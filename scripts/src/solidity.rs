//! Definitions of the Solidity interfaces called during deployment
#![allow(missing_docs, clippy::too_many_arguments)]

use alloy::sol;

sol! {
    /// The swap parameters shared by the exercise and compounder contracts
    #[derive(Debug, PartialEq, Eq)]
    struct SwapProps {
        address swapper;
        address exchangeAddress;
        uint8 exchangeTypes;
        uint256 maxSwapSlippage;
    }

    #[sol(rpc)]
    contract ReaperSwapper {
        function initialize(address[] memory strategists, address guardian, address superAdmin) external;
    }

    contract ThenaOracle {
        constructor(address thenaPair, address token, address owner, uint56 secs, uint128 minPrice);
    }

    #[sol(rpc)]
    contract OptionsToken {
        function initialize(string memory name, string memory symbol, address tokenAdmin) external;
        function setExerciseContract(address _address, bool _isExercise) external;
        function mint(address to, uint256 amount) external;
        function balanceOf(address account) external view returns (uint256);

        function initiateUpgradeCooldown(address _nextImplementation) external;
        function upgradeTo(address newImplementation) external;
        function upgradeProposalTime() external view returns (uint256);
        function nextImplementation() external view returns (address);
        function UPGRADE_TIMELOCK() external view returns (uint256);
    }

    contract DiscountExercise {
        constructor(
            address oToken,
            address owner,
            address paymentToken,
            address underlyingToken,
            address oracle,
            uint256 multiplier,
            uint256 instantExitFee,
            uint256 minAmountToTriggerSwap,
            address[] feeRecipients,
            uint256[] feeBPS,
            SwapProps swapProps
        );
    }

    #[sol(rpc)]
    contract OptionsCompounder {
        function initialize(
            address optionsToken,
            address addressProvider,
            SwapProps memory swapProps,
            address oracle,
            address[] memory strats
        ) external;
        function setStrats(address[] memory strats) external;
    }

    contract ERC1967Proxy {
        constructor(address implementation, bytes data);
    }
}
