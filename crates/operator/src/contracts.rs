//! Bindings for the contracts the operator reads from and writes to.
//!
//! Only the functions actually called are declared.

use alloy::sol;

sol! {
    /// Lido address registry on the source chain.
    #[sol(rpc)]
    interface ILidoLocator {
        function accountingOracle() external view returns (address);
    }

    #[sol(rpc)]
    interface IAccountingOracle {
        function getConsensusContract() external view returns (address);
    }

    /// Lido HashConsensus, the owner of frame boundaries.
    #[sol(rpc)]
    interface IHashConsensus {
        function getFrameConfig()
            external
            view
            returns (uint256 initialEpoch, uint256 epochsPerFrame, uint256 fastLaneLengthSlots);

        function getChainConfig()
            external
            view
            returns (uint256 slotsPerEpoch, uint256 secondsPerSlot, uint256 genesisTime);

        function getCurrentFrame()
            external
            view
            returns (uint256 refSlot, uint256 reportProcessingDeadlineSlot);
    }

    /// Target oracle taking a bare slot.
    #[sol(rpc)]
    interface ISuccinctLidoOracleV1 {
        function reports(uint256 slot)
            external
            view
            returns (
                bool requested,
                bool received,
                uint256 clBalanceGwei,
                uint256 numValidators,
                uint256 exitedValidators
            );

        function requestUpdate(uint64 slot, uint32 callbackGasLimit) external payable;
    }

    /// Target oracle taking the beacon block root of the resolved header.
    #[sol(rpc)]
    interface ISuccinctLidoOracleV2 {
        function reports(uint256 slot)
            external
            view
            returns (
                bool requested,
                bool received,
                uint256 clBalanceGwei,
                uint256 numValidators,
                uint256 exitedValidators
            );

        function requestUpdate(bytes32 blockRoot, uint64 slot, uint32 callbackGasLimit)
            external
            payable;
    }
}
