//! Oracle frames as defined by the HashConsensus contract.

use async_trait::async_trait;

use crate::error::Result;

/// The reporting period currently open on the consensus contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Slot the frame's report describes.
    pub ref_slot: u64,
    /// Last slot at which a report for `ref_slot` may still be processed.
    pub deadline_slot: u64,
}

/// `getFrameConfig()` of the consensus contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    pub initial_epoch: u64,
    pub epochs_per_frame: u64,
    pub fast_lane_length_slots: u64,
}

/// `getChainConfig()` of the consensus contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusChainConfig {
    pub slots_per_epoch: u64,
    pub seconds_per_slot: u64,
    pub genesis_time: u64,
}

impl FrameConfig {
    pub fn slots_per_frame(&self, chain: &ConsensusChainConfig) -> u64 {
        self.epochs_per_frame.saturating_mul(chain.slots_per_epoch)
    }
}

/// Source of the current frame.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn current_frame(&self) -> Result<Frame>;
}
