//! Missed-slot tolerant header lookup.
//!
//! The oracle is keyed by reference slot, but the reference slot itself may
//! have no block. The resolver walks forward to the first canonical block that
//! is already finalized; the request still carries the reference slot.

use metrics::counter;
use tracing::{debug, info, instrument};

use crate::{
    beacon_client::{BeaconApi, BlockId},
    error::{OperatorError, Result},
    header::BeaconBlockHeader,
    metrics::MISSED_SLOTS,
};

/// Returns the header of the lowest canonical slot in `target_slot..=finalized_slot`.
///
/// Fails with [`OperatorError::HeaderNotFound`] when the range is empty or every
/// slot in it was missed. Transport errors abort the scan.
#[instrument(name = "resolver::resolve", skip(beacon))]
pub async fn resolve_header<B>(
    beacon: &B,
    target_slot: u64,
    finalized_slot: u64,
) -> Result<BeaconBlockHeader>
where
    B: BeaconApi + ?Sized,
{
    for slot in target_slot..=finalized_slot {
        match beacon.header(BlockId::Slot(slot)).await? {
            Some(header) => {
                if slot > target_slot {
                    info!(
                        target_slot,
                        resolved_slot = slot,
                        skipped = slot - target_slot,
                        "Reference slot was missed, using next canonical block"
                    );
                }
                return Ok(header);
            }
            None => {
                debug!(slot, "Missed slot");
                counter!(MISSED_SLOTS).increment(1);
            }
        }
    }

    Err(OperatorError::HeaderNotFound {
        from: target_slot,
        to: finalized_slot,
    })
}
