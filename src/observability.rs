use crate::board::Flow;

// ── Slot generation ─────────────────────────────────────────────

/// Counter: slot grids built. Labels: day (`open` | `closed`).
pub const SLOT_GRIDS_TOTAL: &str = "classlot_slot_grids_total";

/// Histogram: time to build one open day's grid, in seconds.
pub const SLOT_GENERATION_DURATION_SECONDS: &str = "classlot_slot_generation_duration_seconds";

// ── Board fetches ───────────────────────────────────────────────

/// Counter: reservation fetches started. Labels: flow.
pub const FETCHES_TOTAL: &str = "classlot_fetches_total";

/// Counter: fetches that failed and fell back to "nothing booked".
pub const FETCH_FAILURES_TOTAL: &str = "classlot_fetch_failures_total";

/// Counter: fetch responses dropped because a newer fetch superseded them.
pub const STALE_FETCHES_TOTAL: &str = "classlot_stale_fetches_total";

/// Counter: slot taps rejected. Labels: reason (`busy` | `range`).
pub const SELECTIONS_REJECTED_TOTAL: &str = "classlot_selections_rejected_total";

/// Map a Flow variant to a short label for metrics.
pub fn flow_label(flow: Flow) -> &'static str {
    match flow {
        Flow::Single => "single",
        Flow::Series => "series",
    }
}
