use futures::future::join_all;
use serde::Serialize;

use crate::model::*;
use crate::source::{ReservationSource, SourceError};

/// How many classrooms are free right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OccupancySummary {
    pub available_now: usize,
    pub occupied_now: usize,
    pub total: usize,
}

/// A room is occupied while an active booking contains `now`.
pub fn occupancy_at<'a>(rooms: impl IntoIterator<Item = &'a [BookedInterval]>, now: Ms) -> OccupancySummary {
    let mut summary = OccupancySummary::default();
    for booked in rooms {
        summary.total += 1;
        if is_occupied(booked, now) {
            summary.occupied_now += 1;
        } else {
            summary.available_now += 1;
        }
    }
    summary
}

pub fn is_occupied(booked: &[BookedInterval], now: Ms) -> bool {
    booked
        .iter()
        .any(|b| b.status.is_active() && b.span.contains_instant(now))
}

/// Fetch every room's bookings at `now` concurrently and summarize.
pub async fn summarize(
    source: &dyn ReservationSource,
    rooms: &[ClassroomId],
    now: Ms,
) -> Result<OccupancySummary, SourceError> {
    let instant = Span::new(now, now + 1);
    let fetched = join_all(rooms.iter().map(|&room| source.reservations_between(room, instant))).await;
    let lists = fetched.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(occupancy_at(lists.iter().map(Vec::as_slice), now))
}
