use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds. The only instant type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;

pub type ClassroomId = Ulid;
pub type ReservationId = Ulid;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// Strict intersection: spans that only touch do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Confirmed,
    Pending,
    Rejected,
    Cancelled,
}

impl ReservationStatus {
    /// Confirmed and pending reservations hold the room; the rest are history.
    pub fn is_active(self) -> bool {
        matches!(self, ReservationStatus::Confirmed | ReservationStatus::Pending)
    }
}

/// An existing reservation as seen by the availability calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub id: ReservationId,
    pub span: Span,
    pub status: ReservationStatus,
    pub purpose: Option<String>,
    pub owner: Option<String>,
}

impl BookedInterval {
    pub fn new(span: Span, status: ReservationStatus) -> Self {
        Self {
            id: Ulid::new(),
            span,
            status,
            purpose: None,
            owner: None,
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn blocks(&self, span: &Span) -> bool {
        self.status.is_active() && self.span.overlaps(span)
    }
}

/// One generated candidate reservation interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSlot {
    /// Position in the generated list.
    pub index: usize,
    pub span: Span,
    pub busy: bool,
    /// Purpose of the first reservation blocking this slot.
    pub booked_by: Option<String>,
}

/// Rendering tag for a slot once a range selection is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotState {
    Free,
    Busy,
    Selected,
    RangeStart,
    RangeEnd,
}

/// What gets handed to the reservation submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationDraft {
    pub classroom: ClassroomId,
    pub span: Span,
    pub purpose: Option<String>,
    pub requestor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let s = Span::new(100, 200);
        assert_eq!(s.duration_ms(), 100);
        assert!(s.contains_instant(100));
        assert!(s.contains_instant(199));
        assert!(!s.contains_instant(200)); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(100, 200);
        let b = Span::new(150, 250);
        let c = Span::new(200, 300);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn single_ms_overlap_counts() {
        let a = Span::new(100, 201);
        let b = Span::new(200, 300);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn only_confirmed_and_pending_are_active() {
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(ReservationStatus::Pending.is_active());
        assert!(!ReservationStatus::Rejected.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }

    #[test]
    fn cancelled_booking_never_blocks() {
        let b = BookedInterval::new(Span::new(0, 100), ReservationStatus::Cancelled);
        assert!(!b.blocks(&Span::new(50, 60)));
        let b = BookedInterval::new(Span::new(0, 100), ReservationStatus::Pending);
        assert!(b.blocks(&Span::new(50, 60)));
        assert!(!b.blocks(&Span::new(100, 160)));
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&ReservationStatus::Confirmed).unwrap();
        assert_eq!(json, "\"CONFIRMED\"");
        let s: ReservationStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(s, ReservationStatus::Cancelled);
    }
}
