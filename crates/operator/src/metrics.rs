//! Metric names and descriptions.
//!
//! Values are recorded through the `metrics` facade; installing a recorder is
//! up to the binary.

use metrics::{Unit, describe_counter, describe_gauge};

pub const CYCLES: &str = "beacon_oracle_cycles_total";
pub const CYCLE_ERRORS: &str = "beacon_oracle_cycle_errors_total";
pub const REQUESTS_SUBMITTED: &str = "beacon_oracle_requests_submitted_total";
pub const MISSED_SLOTS: &str = "beacon_oracle_missed_slots_total";
pub const REF_SLOT: &str = "beacon_oracle_ref_slot";
pub const DEADLINE_SLOT: &str = "beacon_oracle_deadline_slot";
pub const FINALIZED_SLOT: &str = "beacon_oracle_finalized_slot";
pub const CYCLE_DURATION: &str = "beacon_oracle_cycle_duration_seconds";

pub fn describe() {
    describe_counter!(CYCLES, "Reconciliation cycles completed, by outcome");
    describe_counter!(CYCLE_ERRORS, "Reconciliation cycles abandoned, by error kind");
    describe_counter!(REQUESTS_SUBMITTED, "requestUpdate transactions confirmed");
    describe_counter!(MISSED_SLOTS, "Slots without a canonical block skipped during resolution");
    describe_gauge!(REF_SLOT, "Reference slot of the current frame");
    describe_gauge!(DEADLINE_SLOT, "Processing deadline slot of the current frame");
    describe_gauge!(FINALIZED_SLOT, "Latest finalized beacon slot seen");
    describe_gauge!(CYCLE_DURATION, Unit::Seconds, "Duration of the last reconciliation cycle");
}
