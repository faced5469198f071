//! The reconciliation loop.
//!
//! Every cycle re-reads the frame and the oracle's flags for its reference
//! slot and submits at most one request. Nothing is remembered between cycles,
//! so restarts and concurrent operators only ever see on-chain state.

use std::time::{Duration, Instant};

use alloy::primitives::B256;
use metrics::{counter, gauge};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::{
    beacon_client::BeaconApi,
    cadence::Cadence,
    error::{OperatorError, Result},
    frame::{Frame, FrameSource},
    header::BlockRoot,
    metrics::{
        CYCLE_DURATION, CYCLE_ERRORS, CYCLES, DEADLINE_SLOT, FINALIZED_SLOT, REF_SLOT,
        REQUESTS_SUBMITTED,
    },
    oracle::{ReportOracle, ReportStatus, RequestSubmission},
    resolver::resolve_header,
};

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    AlreadyReceived {
        ref_slot: u64,
    },
    AlreadyRequested {
        ref_slot: u64,
    },
    DeadlinePassed {
        ref_slot: u64,
        deadline_slot: u64,
        finalized_slot: u64,
    },
    Submitted {
        ref_slot: u64,
        /// Slot of the header the request references, for block-root oracles.
        block_slot: Option<u64>,
        block_root: Option<BlockRoot>,
        tx_hash: B256,
    },
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AlreadyReceived { .. } => "already_received",
            Self::AlreadyRequested { .. } => "already_requested",
            Self::DeadlinePassed { .. } => "deadline_passed",
            Self::Submitted { .. } => "submitted",
        }
    }
}

/// What a cycle would do for the current state, without submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    AlreadyReceived,
    AlreadyRequested,
    DeadlinePassed { finalized_slot: u64 },
    Request { finalized_slot: u64 },
}

/// A [`Decision`] together with the oracle flags it was taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub status: ReportStatus,
    pub decision: Decision,
}

pub struct Operator<B, F, O> {
    beacon: B,
    frames: F,
    oracle: O,
    callback_gas_limit: u32,
    cadence: Cadence,
}

impl<B, F, O> Operator<B, F, O>
where
    B: BeaconApi,
    F: FrameSource,
    O: ReportOracle,
{
    pub fn new(beacon: B, frames: F, oracle: O, callback_gas_limit: u32, cadence: Cadence) -> Self {
        Self {
            beacon,
            frames,
            oracle,
            callback_gas_limit,
            cadence,
        }
    }

    pub fn beacon(&self) -> &B {
        &self.beacon
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Decides what to do for `frame` from the oracle flags and finality.
    ///
    /// The finalized slot is only fetched once the flags say a request may be needed.
    pub async fn decide(&self, frame: &Frame) -> Result<Assessment> {
        let status = self.oracle.report_status(frame.ref_slot).await?;
        info!(
            ref_slot = frame.ref_slot,
            requested = status.requested,
            received = status.received,
            "Read report status"
        );

        let decision = if status.received {
            Decision::AlreadyReceived
        } else if status.requested {
            Decision::AlreadyRequested
        } else {
            let finalized_slot = self.beacon.finalized_slot().await?;
            gauge!(FINALIZED_SLOT).set(finalized_slot as f64);

            if finalized_slot >= frame.deadline_slot {
                Decision::DeadlinePassed { finalized_slot }
            } else {
                Decision::Request { finalized_slot }
            }
        };
        Ok(Assessment { status, decision })
    }

    /// Runs one reconciliation cycle.
    #[instrument(name = "operator::reconcile", skip(self))]
    pub async fn reconcile(&self) -> Result<CycleOutcome> {
        let frame = self.frames.current_frame().await?;
        gauge!(REF_SLOT).set(frame.ref_slot as f64);
        gauge!(DEADLINE_SLOT).set(frame.deadline_slot as f64);
        info!(
            ref_slot = frame.ref_slot,
            deadline_slot = frame.deadline_slot,
            "Read current frame"
        );

        let ref_slot = frame.ref_slot;
        let finalized_slot = match self.decide(&frame).await?.decision {
            Decision::AlreadyReceived => {
                info!(ref_slot, "Oracle already has the report");
                return Ok(CycleOutcome::AlreadyReceived { ref_slot });
            }
            Decision::AlreadyRequested => {
                info!(ref_slot, "Report already requested, skipping");
                return Ok(CycleOutcome::AlreadyRequested { ref_slot });
            }
            Decision::DeadlinePassed { finalized_slot } => {
                info!(
                    ref_slot,
                    deadline_slot = frame.deadline_slot,
                    finalized_slot,
                    "Finalized slot is past the deadline, skipping"
                );
                return Ok(CycleOutcome::DeadlinePassed {
                    ref_slot,
                    deadline_slot: frame.deadline_slot,
                    finalized_slot,
                });
            }
            Decision::Request { finalized_slot } => finalized_slot,
        };

        let (block_slot, block_root) = if self.oracle.interface().requires_block_root() {
            let header = resolve_header(&self.beacon, ref_slot, finalized_slot).await?;
            let root = header.hash_tree_root()?;
            info!(ref_slot, block_slot = header.slot, block_root = %root, "Resolved header");
            (Some(header.slot), Some(root))
        } else {
            (None, None)
        };

        let request = RequestSubmission {
            ref_slot,
            block_root,
            callback_gas_limit: self.callback_gas_limit,
        };
        info!(
            ref_slot,
            interface = self.oracle.interface().as_str(),
            callback_gas_limit = self.callback_gas_limit,
            "Requesting update"
        );

        let tx_hash = self.oracle.request_update(&request).await?;
        counter!(REQUESTS_SUBMITTED).increment(1);

        info!(ref_slot, %tx_hash, "Update requested");

        Ok(CycleOutcome::Submitted {
            ref_slot,
            block_slot,
            block_root,
            tx_hash,
        })
    }

    /// Runs cycles until `shutdown` is cancelled.
    ///
    /// Cancellation is checked between cycles, so a started cycle always
    /// completes. The sleep between cycles is interrupted by it. Cycle errors
    /// are logged and the next cycle starts over from fresh reads.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("Starting reconciliation loop");

        while !shutdown.is_cancelled() {
            let started = Instant::now();
            match self.reconcile().await {
                Ok(outcome) => {
                    counter!(CYCLES, "outcome" => outcome.label()).increment(1);
                    info!(outcome = outcome.label(), "Cycle finished");
                }
                Err(err) => self.record_failure(&err),
            }
            let elapsed = started.elapsed();
            gauge!(CYCLE_DURATION).set(elapsed.as_secs_f64());

            let sleep = self.next_sleep().await;
            info!(
                elapsed_secs = elapsed.as_secs_f64(),
                sleep_secs = sleep.as_secs(),
                "Waiting for next cycle"
            );

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(sleep) => {}
            }
        }

        info!("Reconciliation loop stopped");
    }

    fn record_failure(&self, err: &OperatorError) {
        counter!(CYCLE_ERRORS, "kind" => err.kind()).increment(1);
        match err {
            OperatorError::HeaderNotFound { from, to } => warn!(
                from,
                to,
                "No canonical header up to the finalized slot, deferring to next cycle"
            ),
            err if err.is_fatal() => error!(
                error = %err,
                kind = err.kind(),
                "Cycle failed on an error retrying will not fix, check the deployment"
            ),
            err => error!(error = %err, kind = err.kind(), "Cycle failed"),
        }
    }

    async fn next_sleep(&self) -> Duration {
        let frame = match self.frames.current_frame().await {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "Could not read frame for scheduling");
                return self.cadence.max_interval();
            }
        };
        let finalized_slot = match self.beacon.finalized_slot().await {
            Ok(slot) => slot,
            Err(err) => {
                warn!(error = %err, "Could not read finalized slot for scheduling");
                return self.cadence.max_interval();
            }
        };

        info!(
            next_frame_slot = self.cadence.next_frame_slot(frame.ref_slot),
            finalized_slot,
            "Scheduling next cycle"
        );
        self.cadence.sleep_duration(frame.ref_slot, finalized_slot)
    }
}
