use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::CivilCalendar;
use crate::limits::MAX_SERIES_DAYS;
use crate::model::*;

use super::SlotError;

/// A weekly recurring reservation: the same wall-clock window on the listed
/// weekdays of every week between `first_day` and `last_day` (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySeries {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub weekdays: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WeeklySeries {
    /// Concrete spans of the series, in date order. Seconds are ignored.
    pub fn occurrences(&self, calendar: &dyn CivilCalendar) -> Result<Vec<Span>, SlotError> {
        let start_minute = minute_of_day(self.start);
        let end_minute = minute_of_day(self.end);
        if start_minute >= end_minute {
            return Err(SlotError::InvalidSeries("start time must be before end time"));
        }
        if self.weekdays.is_empty() {
            return Err(SlotError::InvalidSeries("no weekday selected"));
        }
        if self.first_day > self.last_day {
            return Err(SlotError::InvalidSeries("first day is after last day"));
        }
        if (self.last_day - self.first_day).num_days() + 1 > MAX_SERIES_DAYS {
            return Err(SlotError::LimitExceeded("series spans too many days"));
        }

        let mut spans = Vec::new();
        for day in self.first_day.iter_days().take_while(|d| *d <= self.last_day) {
            if self.weekdays.contains(&day.weekday()) {
                spans.push(Span::new(
                    calendar.instant(day, start_minute)?,
                    calendar.instant(day, end_minute)?,
                ));
            }
        }
        if spans.is_empty() {
            return Err(SlotError::InvalidSeries("no occurrence falls inside the date range"));
        }
        Ok(spans)
    }

    pub fn label(&self) -> String {
        recurrence_label(&self.weekdays)
    }
}

/// Fail on the first occurrence that collides with an active booking.
/// `exclude` skips the reservation being edited.
pub fn check_series(
    occurrences: &[Span],
    booked: &[BookedInterval],
    exclude: Option<ReservationId>,
) -> Result<(), SlotError> {
    for span in occurrences {
        let blocker = booked
            .iter()
            .filter(|b| Some(b.id) != exclude && b.blocks(span))
            .min_by_key(|b| b.span.start);
        if let Some(b) = blocker {
            return Err(SlotError::Conflict {
                span: *span,
                blocker: b.id,
                purpose: b.purpose.clone(),
                owner: b.owner.clone(),
            });
        }
    }
    Ok(())
}

/// Short weekday list in week order, e.g. `"Mon, Wed, Fri"`.
pub fn recurrence_label(weekdays: &[Weekday]) -> String {
    let mut days: Vec<Weekday> = weekdays.to_vec();
    days.sort_by_key(|d| d.num_days_from_monday());
    days.dedup();
    days.iter().map(|d| short_name(*d)).collect::<Vec<_>>().join(", ")
}

fn short_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Zoned;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn series(weekdays: Vec<Weekday>) -> WeeklySeries {
        WeeklySeries {
            first_day: date(2024, 6, 3),
            last_day: date(2024, 6, 30),
            weekdays,
            start: hm(10, 0),
            end: hm(11, 30),
        }
    }

    #[test]
    fn expands_listed_weekdays_only() {
        let cal = Zoned::utc();
        let spans = series(vec![Weekday::Mon, Weekday::Wed]).occurrences(&cal).unwrap();
        // June 2024: Mondays 3,10,17,24 and Wednesdays 5,12,19,26.
        assert_eq!(spans.len(), 8);
        assert_eq!(spans[0].start, cal.instant(date(2024, 6, 3), 600).unwrap());
        assert_eq!(spans[1].start, cal.instant(date(2024, 6, 5), 600).unwrap());
        assert!(spans.iter().all(|s| s.duration_ms() == 90 * MINUTE_MS));
        assert!(spans.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn rejects_inverted_times() {
        let mut s = series(vec![Weekday::Tue]);
        s.end = hm(9, 0);
        assert!(matches!(s.occurrences(&Zoned::utc()), Err(SlotError::InvalidSeries(_))));
    }

    #[test]
    fn rejects_empty_weekdays_and_inverted_dates() {
        assert!(series(vec![]).occurrences(&Zoned::utc()).is_err());
        let mut s = series(vec![Weekday::Tue]);
        s.first_day = date(2024, 7, 1);
        assert!(matches!(s.occurrences(&Zoned::utc()), Err(SlotError::InvalidSeries(_))));
    }

    #[test]
    fn rejects_range_without_occurrence() {
        let mut s = series(vec![Weekday::Sun]);
        s.first_day = date(2024, 6, 3);
        s.last_day = date(2024, 6, 7);
        assert!(matches!(s.occurrences(&Zoned::utc()), Err(SlotError::InvalidSeries(_))));
    }

    #[test]
    fn rejects_overlong_range() {
        let mut s = series(vec![Weekday::Mon]);
        s.last_day = date(2026, 1, 1);
        assert!(matches!(s.occurrences(&Zoned::utc()), Err(SlotError::LimitExceeded(_))));
    }

    #[test]
    fn conflict_reports_first_collision() {
        let cal = Zoned::utc();
        let spans = series(vec![Weekday::Mon]).occurrences(&cal).unwrap();
        let seventeenth = cal.instant(date(2024, 6, 17), 11 * 60).unwrap();
        let blocker = BookedInterval::new(
            Span::new(seventeenth, seventeenth + 60 * MINUTE_MS),
            ReservationStatus::Confirmed,
        )
        .with_purpose("Seminar")
        .with_owner("Ana");
        let cancelled = BookedInterval::new(spans[0], ReservationStatus::Cancelled);
        let booked = vec![cancelled, blocker.clone()];

        match check_series(&spans, &booked, None) {
            Err(SlotError::Conflict { span, blocker: id, purpose, owner }) => {
                assert_eq!(span, spans[2]);
                assert_eq!(id, blocker.id);
                assert_eq!(purpose.as_deref(), Some("Seminar"));
                assert_eq!(owner.as_deref(), Some("Ana"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        // Editing the blocking reservation itself is not a conflict.
        assert!(check_series(&spans, &booked, Some(blocker.id)).is_ok());
    }

    #[test]
    fn adjacent_booking_is_not_a_conflict() {
        let cal = Zoned::utc();
        let spans = series(vec![Weekday::Mon]).occurrences(&cal).unwrap();
        let after = BookedInterval::new(
            Span::new(spans[0].end, spans[0].end + 30 * MINUTE_MS),
            ReservationStatus::Confirmed,
        );
        assert!(check_series(&spans, &[after], None).is_ok());
    }

    #[test]
    fn label_sorted_and_deduplicated() {
        assert_eq!(
            recurrence_label(&[Weekday::Fri, Weekday::Mon, Weekday::Fri, Weekday::Wed]),
            "Mon, Wed, Fri"
        );
        assert_eq!(series(vec![Weekday::Thu]).label(), "Thu");
    }
}
