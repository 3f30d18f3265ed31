use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use dashmap::DashMap;
use serde::Deserialize;
use ulid::Ulid;

use crate::limits::MAX_LABEL_LEN;
use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The store could not be reached or answered with an error.
    Unavailable(String),
    UnknownClassroom(ClassroomId),
    InvalidRecord(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable(e) => write!(f, "reservation store unavailable: {e}"),
            SourceError::UnknownClassroom(id) => write!(f, "unknown classroom: {id}"),
            SourceError::InvalidRecord(e) => write!(f, "invalid reservation record: {e}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Read side of the reservation store.
#[async_trait]
pub trait ReservationSource: Send + Sync {
    /// Every reservation of `classroom` overlapping `window`, whatever its status.
    async fn reservations_between(
        &self,
        classroom: ClassroomId,
        window: Span,
    ) -> Result<Vec<BookedInterval>, SourceError>;
}

/// One reservation as it appears in a JSON dump.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationRecord {
    pub classroom: ClassroomId,
    #[serde(default)]
    pub id: Option<ReservationId>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub status: ReservationStatus,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl ReservationRecord {
    fn into_interval(self) -> Result<(ClassroomId, BookedInterval), SourceError> {
        let start = self.start.timestamp_millis();
        let end = self.end.timestamp_millis();
        if start >= end {
            return Err(SourceError::InvalidRecord(format!(
                "reservation ends before it starts: {} .. {}",
                self.start, self.end
            )));
        }
        for label in [&self.purpose, &self.owner].into_iter().flatten() {
            if label.len() > MAX_LABEL_LEN {
                return Err(SourceError::InvalidRecord("label too long".into()));
            }
        }
        Ok((
            self.classroom,
            BookedInterval {
                id: self.id.unwrap_or_else(Ulid::new),
                span: Span::new(start, end),
                status: self.status,
                purpose: self.purpose,
                owner: self.owner,
            },
        ))
    }
}

/// Reservation store held in memory, per classroom, sorted by start.
pub struct InMemorySource {
    classrooms: DashMap<ClassroomId, Vec<BookedInterval>>,
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            classrooms: DashMap::new(),
        }
    }

    pub fn from_records(records: Vec<ReservationRecord>) -> Result<Self, SourceError> {
        let source = Self::new();
        for record in records {
            let (classroom, interval) = record.into_interval()?;
            source.insert(classroom, interval);
        }
        Ok(source)
    }

    pub fn add_classroom(&self, id: ClassroomId) {
        self.classrooms.entry(id).or_default();
    }

    pub fn classroom_ids(&self) -> Vec<ClassroomId> {
        self.classrooms.iter().map(|e| *e.key()).collect()
    }

    /// Insert keeping the per-classroom list sorted by start.
    pub fn insert(&self, classroom: ClassroomId, interval: BookedInterval) {
        let mut list = self.classrooms.entry(classroom).or_default();
        let pos = list
            .binary_search_by_key(&interval.span.start, |i| i.span.start)
            .unwrap_or_else(|e| e);
        list.insert(pos, interval);
    }

    pub fn remove(&self, classroom: ClassroomId, id: ReservationId) -> Option<BookedInterval> {
        let mut list = self.classrooms.get_mut(&classroom)?;
        let pos = list.iter().position(|i| i.id == id)?;
        Some(list.remove(pos))
    }

    pub fn set_status(&self, classroom: ClassroomId, id: ReservationId, status: ReservationStatus) -> bool {
        let Some(mut list) = self.classrooms.get_mut(&classroom) else {
            return false;
        };
        match list.iter_mut().find(|i| i.id == id) {
            Some(interval) => {
                interval.status = status;
                true
            }
            None => false,
        }
    }
}

/// Intervals of a start-sorted list that overlap `window`.
/// Everything at or after `partition_point` starts at or after `window.end`.
fn overlapping(sorted: &[BookedInterval], window: &Span) -> Vec<BookedInterval> {
    let right_bound = sorted.partition_point(|i| i.span.start < window.end);
    sorted[..right_bound]
        .iter()
        .filter(|i| i.span.end > window.start)
        .cloned()
        .collect()
}

#[async_trait]
impl ReservationSource for InMemorySource {
    async fn reservations_between(
        &self,
        classroom: ClassroomId,
        window: Span,
    ) -> Result<Vec<BookedInterval>, SourceError> {
        let list = self
            .classrooms
            .get(&classroom)
            .ok_or(SourceError::UnknownClassroom(classroom))?;
        Ok(overlapping(&list, &window))
    }
}
