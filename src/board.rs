use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::engine::{generate_slots, RangeSelection, SelectionChange, SlotError};
use crate::model::*;
use crate::notify::NoticeLevel;
use crate::observability::*;
use crate::source::{ReservationSource, SourceError};

/// Which reservation flow the board feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flow {
    /// One-off reservation: slots that already started today are hidden.
    #[default]
    Single,
    /// Weekly series: the grid is a template, so nothing is hidden.
    Series,
}

/// A fetch request handed out by [`AvailabilityBoard::begin_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub classroom: ClassroomId,
    pub window: Span,
}

/// State behind the availability and reservation-builder screens.
///
/// Every input setter rebuilds the slot grid right away from whatever
/// bookings are known. Loading bookings is a separate two-step exchange
/// (`begin_fetch` / `complete_fetch`) so that a response arriving after
/// the inputs changed again is recognised by its generation and dropped.
pub struct AvailabilityBoard {
    ctx: Arc<AppContext>,
    classroom: Option<ClassroomId>,
    date: Option<NaiveDate>,
    duration_blocks: u32,
    flow: Flow,
    editing: Option<ReservationId>,
    booked: Vec<BookedInterval>,
    slots: Vec<CandidateSlot>,
    selection: RangeSelection,
    generation: u64,
    loading: bool,
}

impl AvailabilityBoard {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            classroom: None,
            date: None,
            duration_blocks: 1,
            flow: Flow::Single,
            editing: None,
            booked: Vec::new(),
            slots: Vec::new(),
            selection: RangeSelection::new(),
            generation: 0,
            loading: false,
        }
    }

    // ── Inputs ───────────────────────────────────────────────

    pub fn set_classroom(&mut self, classroom: Option<ClassroomId>) -> Result<(), SlotError> {
        if self.classroom != classroom {
            self.classroom = classroom;
            self.reset_day();
        }
        self.recompute()
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) -> Result<(), SlotError> {
        if self.date != date {
            self.date = date;
            self.reset_day();
        }
        self.recompute()
    }

    pub fn set_duration_blocks(&mut self, blocks: u32) -> Result<(), SlotError> {
        if blocks == 0 || blocks > crate::limits::MAX_DURATION_BLOCKS {
            return Err(SlotError::InvalidDuration(blocks));
        }
        self.duration_blocks = blocks;
        self.selection.clear();
        self.recompute()
    }

    pub fn set_flow(&mut self, flow: Flow) -> Result<(), SlotError> {
        self.flow = flow;
        self.recompute()
    }

    /// Exclude an existing reservation from blocking (editing it in place).
    pub fn set_editing(&mut self, reservation: Option<ReservationId>) -> Result<(), SlotError> {
        self.editing = reservation;
        self.recompute()
    }

    /// Bookings belong to one (classroom, date); a change invalidates them
    /// along with any fetch still in flight for the old key.
    fn reset_day(&mut self) {
        self.booked.clear();
        self.selection.clear();
        self.generation += 1;
        self.loading = false;
    }

    /// Rebuild the grid from the current inputs and known bookings.
    pub fn recompute(&mut self) -> Result<(), SlotError> {
        let (Some(_), Some(date)) = (self.classroom, self.date) else {
            self.slots.clear();
            self.selection.clear();
            return Ok(());
        };
        let now = match self.flow {
            Flow::Single => Some(self.ctx.now()),
            Flow::Series => None,
        };
        let blocking = self.blocking();
        let generated = generate_slots(
            &self.ctx.policy,
            self.ctx.calendar.as_ref(),
            date,
            self.duration_blocks,
            &blocking,
            now,
        );
        let slots = match generated {
            Ok(slots) => slots,
            Err(e) => {
                self.slots.clear();
                self.selection.clear();
                return Err(e);
            }
        };
        let previous = std::mem::replace(&mut self.slots, slots);
        self.selection.remap(&previous, &self.slots);
        if !self.selection.is_valid_for(&self.slots, &blocking) {
            debug!("selection no longer fits the grid, clearing");
            self.selection.clear();
        }
        Ok(())
    }

    /// Known bookings minus the one being edited.
    fn blocking(&self) -> Vec<BookedInterval> {
        self.booked
            .iter()
            .filter(|b| Some(b.id) != self.editing)
            .cloned()
            .collect()
    }

    // ── Fetching ─────────────────────────────────────────────

    /// Start loading bookings for the current classroom and date.
    ///
    /// Returns `None` when there is nothing to load: an input is missing or
    /// the building is closed that day. Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let classroom = self.classroom?;
        let date = self.date?;
        let hours = self.ctx.policy.hours.for_day(date.weekday())?;
        let calendar = self.ctx.calendar.as_ref();
        let window = match (calendar.instant(date, hours.open), calendar.instant(date, hours.close)) {
            (Ok(open), Ok(close)) if open < close => Span::new(open, close),
            _ => {
                warn!(%date, "cannot resolve business hours for fetch window");
                return None;
            }
        };

        self.generation += 1;
        self.loading = true;
        metrics::counter!(FETCHES_TOTAL, "flow" => flow_label(self.flow)).increment(1);
        debug!(generation = self.generation, %classroom, %date, "fetching reservations");
        Some(FetchTicket {
            generation: self.generation,
            classroom,
            window,
        })
    }

    /// Apply a fetch result. Returns `Ok(false)` if the ticket was superseded.
    ///
    /// A failed fetch is reported as a notice and the grid is rebuilt as if
    /// nothing were booked.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<BookedInterval>, SourceError>,
    ) -> Result<bool, SlotError> {
        if ticket.generation != self.generation {
            metrics::counter!(STALE_FETCHES_TOTAL).increment(1);
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "dropping superseded reservation fetch"
            );
            return Ok(false);
        }
        self.loading = false;
        self.booked = match result {
            Ok(booked) => {
                info!(classroom = %ticket.classroom, count = booked.len(), "reservations loaded");
                booked
            }
            Err(e) => {
                metrics::counter!(FETCH_FAILURES_TOTAL).increment(1);
                warn!(classroom = %ticket.classroom, "reservation fetch failed: {e}");
                self.ctx
                    .notices
                    .send(NoticeLevel::Danger, "Could not load availability.");
                Vec::new()
            }
        };
        self.recompute()?;
        Ok(true)
    }

    /// `begin_fetch` + query + `complete_fetch`. Returns whether bookings were applied.
    pub async fn refresh(&mut self, source: &dyn ReservationSource) -> Result<bool, SlotError> {
        let Some(ticket) = self.begin_fetch() else {
            self.recompute()?;
            return Ok(false);
        };
        let result = source.reservations_between(ticket.classroom, ticket.window).await;
        self.complete_fetch(ticket, result)
    }

    // ── Selection ────────────────────────────────────────────

    /// Tap on a slot. Rejections are also published as notices.
    pub fn select(&mut self, index: usize) -> Result<SelectionChange, SlotError> {
        let blocking = self.blocking();
        let change = self.selection.select(index, &self.slots, &blocking);
        match &change {
            Err(SlotError::SlotBusy { booked_by, .. }) => {
                metrics::counter!(SELECTIONS_REJECTED_TOTAL, "reason" => "busy").increment(1);
                let message = match booked_by {
                    Some(purpose) => format!("Occupied: {purpose}"),
                    None => "Time slot not available.".to_string(),
                };
                self.ctx.notices.send(NoticeLevel::Warning, message);
            }
            Err(SlotError::RangeBusy { .. }) => {
                metrics::counter!(SELECTIONS_REJECTED_TOTAL, "reason" => "range").increment(1);
                self.ctx
                    .notices
                    .send(NoticeLevel::Danger, "The range collides with another reservation.");
            }
            _ => {}
        }
        change
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_interval(&self) -> Option<Span> {
        self.selection.interval(&self.slots)
    }

    /// Package the selection for the reservation submission endpoint.
    pub fn draft(&self, purpose: Option<String>, requestor: Option<String>) -> Option<ReservationDraft> {
        Some(ReservationDraft {
            classroom: self.classroom?,
            span: self.selected_interval()?,
            purpose,
            requestor,
        })
    }

    // ── Read access ──────────────────────────────────────────

    pub fn slots(&self) -> &[CandidateSlot] {
        &self.slots
    }

    pub fn states(&self) -> Vec<SlotState> {
        self.selection.states(&self.slots)
    }

    pub fn booked(&self) -> &[BookedInterval] {
        &self.booked
    }

    pub fn selection(&self) -> &RangeSelection {
        &self.selection
    }

    pub fn classroom(&self) -> Option<ClassroomId> {
        self.classroom
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }
}
