//! Source-chain reads: contract discovery and HashConsensus frame state.

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{info, instrument};

use crate::{
    contracts::{IAccountingOracle, IHashConsensus, ILidoLocator},
    error::{OperatorError, Result, to_u64},
    frame::{ConsensusChainConfig, Frame, FrameConfig, FrameSource},
};

/// Read-only view of the Lido HashConsensus contract.
#[derive(Clone)]
pub struct LidoConsensus {
    provider: DynProvider,
    hash_consensus: Address,
    frame_config: FrameConfig,
    chain_config: ConsensusChainConfig,
}

impl LidoConsensus {
    /// Connects to the source chain and follows locator → accounting oracle → HashConsensus.
    pub async fn connect(rpc_url: Url, locator: Address) -> Result<Self> {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self::discover(provider, locator).await
    }

    #[instrument(name = "lido::discover", skip(provider))]
    pub async fn discover(provider: DynProvider, locator: Address) -> Result<Self> {
        let accounting_oracle = ILidoLocator::new(locator, provider.clone())
            .accountingOracle()
            .call()
            .await
            .map_err(OperatorError::contract("accountingOracle"))?;

        let hash_consensus = IAccountingOracle::new(accounting_oracle, provider.clone())
            .getConsensusContract()
            .call()
            .await
            .map_err(OperatorError::contract("getConsensusContract"))?;

        info!(%accounting_oracle, %hash_consensus, "Resolved Lido oracle contracts");

        let consensus = IHashConsensus::new(hash_consensus, provider.clone());

        let frame = consensus
            .getFrameConfig()
            .call()
            .await
            .map_err(OperatorError::contract("getFrameConfig"))?;
        let frame_config = FrameConfig {
            initial_epoch: to_u64("initialEpoch", frame.initialEpoch)?,
            epochs_per_frame: to_u64("epochsPerFrame", frame.epochsPerFrame)?,
            fast_lane_length_slots: to_u64("fastLaneLengthSlots", frame.fastLaneLengthSlots)?,
        };

        let chain = consensus
            .getChainConfig()
            .call()
            .await
            .map_err(OperatorError::contract("getChainConfig"))?;
        let chain_config = ConsensusChainConfig {
            slots_per_epoch: to_u64("slotsPerEpoch", chain.slotsPerEpoch)?,
            seconds_per_slot: to_u64("secondsPerSlot", chain.secondsPerSlot)?,
            genesis_time: to_u64("genesisTime", chain.genesisTime)?,
        };

        if frame_config.epochs_per_frame == 0 || chain_config.slots_per_epoch == 0 {
            return Err(OperatorError::Config(format!(
                "HashConsensus {hash_consensus} reports an empty frame"
            )));
        }

        info!(
            initial_epoch = frame_config.initial_epoch,
            epochs_per_frame = frame_config.epochs_per_frame,
            fast_lane_length_slots = frame_config.fast_lane_length_slots,
            slots_per_epoch = chain_config.slots_per_epoch,
            seconds_per_slot = chain_config.seconds_per_slot,
            genesis_time = chain_config.genesis_time,
            "Loaded frame and chain config"
        );

        Ok(Self {
            provider,
            hash_consensus,
            frame_config,
            chain_config,
        })
    }

    pub fn hash_consensus(&self) -> Address {
        self.hash_consensus
    }

    pub fn frame_config(&self) -> FrameConfig {
        self.frame_config
    }

    pub fn chain_config(&self) -> ConsensusChainConfig {
        self.chain_config
    }
}

#[async_trait]
impl FrameSource for LidoConsensus {
    async fn current_frame(&self) -> Result<Frame> {
        let frame = IHashConsensus::new(self.hash_consensus, self.provider.clone())
            .getCurrentFrame()
            .call()
            .await
            .map_err(OperatorError::contract("getCurrentFrame"))?;

        Ok(Frame {
            ref_slot: to_u64("refSlot", frame.refSlot)?,
            deadline_slot: to_u64(
                "reportProcessingDeadlineSlot",
                frame.reportProcessingDeadlineSlot,
            )?,
        })
    }
}
