use chrono::{Datelike, NaiveDate};

use crate::calendar::CivilCalendar;
use crate::hours::SlotPolicy;
use crate::limits::MAX_DURATION_BLOCKS;
use crate::model::*;
use crate::observability::{SLOT_GENERATION_DURATION_SECONDS, SLOT_GRIDS_TOTAL};

use super::SlotError;

// ── Slot generation ───────────────────────────────────────────────

/// Build the candidate slots for one civil day.
///
/// Slots are `duration_blocks` base slots long and start every base slot
/// from opening time; a slot that would end after closing is dropped, never
/// truncated. A slot is busy iff it strictly overlaps an active booking.
///
/// `now` enables the past filter: when `date` is today in `calendar`, slots
/// that have already started are left out. Pass `None` for recurring
/// reservations, which never filter.
pub fn generate_slots(
    policy: &SlotPolicy,
    calendar: &dyn CivilCalendar,
    date: NaiveDate,
    duration_blocks: u32,
    booked: &[BookedInterval],
    now: Option<Ms>,
) -> Result<Vec<CandidateSlot>, SlotError> {
    policy.validate()?;
    if duration_blocks == 0 || duration_blocks > MAX_DURATION_BLOCKS {
        return Err(SlotError::InvalidDuration(duration_blocks));
    }
    let Some(hours) = policy.hours.for_day(date.weekday()) else {
        metrics::counter!(SLOT_GRIDS_TOTAL, "day" => "closed").increment(1);
        return Ok(Vec::new());
    };

    let started = std::time::Instant::now();
    let opening = calendar.instant(date, hours.open)?;
    let closing = calendar.instant(date, hours.close)?;
    let step = policy.slot_ms();
    let length = step * duration_blocks as Ms;
    let cutoff = now.filter(|&t| calendar.civil_date(t) == Some(date));

    let mut slots = Vec::new();
    let mut cursor = opening;
    while cursor + length <= closing {
        let span = Span::new(cursor, cursor + length);
        cursor += step;

        if cutoff.is_some_and(|t| span.start < t) {
            continue;
        }

        let blocker = first_blocker(&span, booked);
        slots.push(CandidateSlot {
            index: slots.len(),
            span,
            busy: blocker.is_some(),
            booked_by: blocker.and_then(|b| b.purpose.clone()),
        });
    }

    metrics::counter!(SLOT_GRIDS_TOTAL, "day" => "open").increment(1);
    metrics::histogram!(SLOT_GENERATION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
    Ok(slots)
}

/// The earliest-starting active booking that overlaps `span`.
pub fn first_blocker<'a>(span: &Span, booked: &'a [BookedInterval]) -> Option<&'a BookedInterval> {
    booked
        .iter()
        .filter(|b| b.blocks(span))
        .min_by_key(|b| b.span.start)
}

pub fn is_busy(span: &Span, booked: &[BookedInterval]) -> bool {
    booked.iter().any(|b| b.blocks(span))
}
