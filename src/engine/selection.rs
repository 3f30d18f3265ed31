use crate::model::*;

use super::availability::is_busy;
use super::SlotError;

/// Two-tap range picker over a generated slot list.
///
/// The first tap sets the start; the second tap at or after the start closes
/// the range if every slot in between is still free. Tapping before the
/// start, or tapping again after a range is complete, starts over.
///
/// Indices refer to one generated grid; after regenerating, `remap` moves
/// them onto the new grid by span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSelection {
    start: Option<usize>,
    end: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Started(usize),
    Completed { start: usize, end: usize },
}

impl RangeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<usize> {
        self.start
    }

    pub fn end(&self) -> Option<usize> {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Apply a tap on `index`. Errors leave the selection untouched.
    pub fn select(
        &mut self,
        index: usize,
        slots: &[CandidateSlot],
        booked: &[BookedInterval],
    ) -> Result<SelectionChange, SlotError> {
        let slot = slots.get(index).ok_or(SlotError::UnknownSlot(index))?;
        if slot.busy || is_busy(&slot.span, booked) {
            return Err(SlotError::SlotBusy {
                index,
                booked_by: slot.booked_by.clone(),
            });
        }

        match (self.start, self.end) {
            (Some(start), None) if index >= start => {
                if let Some(blocked) = first_busy(&slots[start..=index], booked) {
                    return Err(SlotError::RangeBusy {
                        start,
                        end: index,
                        blocked,
                    });
                }
                self.end = Some(index);
                Ok(SelectionChange::Completed { start, end: index })
            }
            _ => {
                self.start = Some(index);
                self.end = None;
                Ok(SelectionChange::Started(index))
            }
        }
    }

    /// True when the selection still points at free slots in `slots`.
    pub fn is_valid_for(&self, slots: &[CandidateSlot], booked: &[BookedInterval]) -> bool {
        let Some(start) = self.start else { return true };
        let end = self.end.unwrap_or(start);
        end < slots.len() && first_busy(&slots[start..=end], booked).is_none()
    }

    /// Re-point the selection at the same spans in a regenerated grid.
    /// Clears it when either end no longer exists in `current`.
    pub fn remap(&mut self, previous: &[CandidateSlot], current: &[CandidateSlot]) {
        let find = |i: usize| {
            let span = previous.get(i)?.span;
            current.iter().position(|s| s.span == span)
        };
        let Some(start) = self.start else { return };
        let end = match self.end {
            Some(end) => find(end).map(Some),
            None => Some(None),
        };
        match (find(start), end) {
            (Some(start), Some(end)) => {
                self.start = Some(start);
                self.end = end;
            }
            _ => self.clear(),
        }
    }

    /// Rendering tags, one per slot.
    pub fn states(&self, slots: &[CandidateSlot]) -> Vec<SlotState> {
        let mut states: Vec<SlotState> = slots
            .iter()
            .map(|s| if s.busy { SlotState::Busy } else { SlotState::Free })
            .collect();
        let Some(start) = self.start else { return states };
        let end = self.end.unwrap_or(start);
        for i in start..=end {
            if let Some(state) = states.get_mut(i) {
                *state = if i == start {
                    SlotState::RangeStart
                } else if i == end {
                    SlotState::RangeEnd
                } else {
                    SlotState::Selected
                };
            }
        }
        states
    }

    /// `[start slot start, end slot end)`; a lone start selects one slot.
    pub fn interval(&self, slots: &[CandidateSlot]) -> Option<Span> {
        let first = slots.get(self.start?)?;
        let last = slots.get(self.end.unwrap_or(first.index))?;
        Some(Span::new(first.span.start, last.span.end))
    }
}

/// Re-test every slot in `range` against the bookings; index of the first busy one.
fn first_busy(range: &[CandidateSlot], booked: &[BookedInterval]) -> Option<usize> {
    range
        .iter()
        .find(|s| s.busy || is_busy(&s.span, booked))
        .map(|s| s.index)
}
