//! Sleep scheduling between reconciliation cycles.

use std::time::Duration;

use crate::frame::{ConsensusChainConfig, FrameConfig};

/// Sleeps until the projected start of the next frame, bounded on both sides.
///
/// The lower bound is one slot so a frame that has not advanced yet cannot make
/// the loop spin. The upper bound makes a skipped or failed cycle come back
/// within the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    slots_per_frame: u64,
    slot_duration: Duration,
    max_interval: Duration,
}

impl Cadence {
    pub fn new(
        frame_config: &FrameConfig,
        chain_config: &ConsensusChainConfig,
        max_interval: Duration,
    ) -> Self {
        let slot_duration = Duration::from_secs(chain_config.seconds_per_slot.max(1));
        Self {
            slots_per_frame: frame_config.slots_per_frame(chain_config),
            slot_duration,
            max_interval: max_interval.max(slot_duration),
        }
    }

    pub fn next_frame_slot(&self, ref_slot: u64) -> u64 {
        ref_slot.saturating_add(self.slots_per_frame)
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    pub fn sleep_duration(&self, ref_slot: u64, finalized_slot: u64) -> Duration {
        let remaining = self.next_frame_slot(ref_slot).saturating_sub(finalized_slot);
        let remaining = u32::try_from(remaining).unwrap_or(u32::MAX);
        self.slot_duration
            .saturating_mul(remaining)
            .clamp(self.slot_duration, self.max_interval)
    }
}
