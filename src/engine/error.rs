use chrono::NaiveDate;

use crate::model::{ReservationId, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Business hours where closing is not after opening, or past midnight.
    InvalidHours { open: u32, close: u32 },
    InvalidSlotLength(u32),
    InvalidDuration(u32),
    /// Wall-clock time skipped by a DST transition.
    NonexistentLocalTime { date: NaiveDate, minute: u32 },
    UnknownSlot(usize),
    SlotBusy { index: usize, booked_by: Option<String> },
    RangeBusy { start: usize, end: usize, blocked: usize },
    InvalidSeries(&'static str),
    Conflict {
        span: Span,
        blocker: ReservationId,
        purpose: Option<String>,
        owner: Option<String>,
    },
    LimitExceeded(&'static str),
}

impl std::fmt::Display for SlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotError::InvalidHours { open, close } => write!(
                f,
                "invalid business hours: opens at {:02}:{:02}, closes at {:02}:{:02}",
                open / 60,
                open % 60,
                close / 60,
                close % 60
            ),
            SlotError::InvalidSlotLength(m) => write!(f, "invalid slot length: {m} minutes"),
            SlotError::InvalidDuration(n) => write!(f, "invalid duration: {n} blocks"),
            SlotError::NonexistentLocalTime { date, minute } => write!(
                f,
                "{date} {:02}:{:02} does not exist in this timezone",
                minute / 60,
                minute % 60
            ),
            SlotError::UnknownSlot(i) => write!(f, "no slot at index {i}"),
            SlotError::SlotBusy { index, booked_by } => match booked_by {
                Some(purpose) => write!(f, "slot {index} is occupied: {purpose}"),
                None => write!(f, "slot {index} is not available"),
            },
            SlotError::RangeBusy { start, end, blocked } => {
                write!(f, "range {start}..={end} collides with a reservation at slot {blocked}")
            }
            SlotError::InvalidSeries(msg) => write!(f, "invalid series: {msg}"),
            SlotError::Conflict {
                span,
                blocker,
                purpose,
                owner,
            } => write!(
                f,
                "conflict on [{}, {}) with reservation {blocker} ({}, {})",
                span.start,
                span.end,
                purpose.as_deref().unwrap_or("no purpose"),
                owner.as_deref().unwrap_or("unknown user")
            ),
            SlotError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for SlotError {}
