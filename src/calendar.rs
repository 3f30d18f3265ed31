use chrono::{LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::engine::SlotError;
use crate::hours::MINUTES_PER_DAY;
use crate::model::Ms;

/// Maps civil dates and wall-clock times to instants and back.
///
/// Every "which day is it" question goes through one of these, so the whole
/// crate agrees on a single timezone convention.
pub trait CivilCalendar: Send + Sync {
    /// Instant of `minute` minutes after civil midnight on `date`.
    /// `minute == MINUTES_PER_DAY` is the midnight that ends the day.
    fn instant(&self, date: NaiveDate, minute: u32) -> Result<Ms, SlotError>;

    fn civil_datetime(&self, t: Ms) -> Option<NaiveDateTime>;

    fn civil_date(&self, t: Ms) -> Option<NaiveDate> {
        self.civil_datetime(t).map(|dt| dt.date())
    }

    /// `HH:MM` wall-clock label.
    fn label(&self, t: Ms) -> String {
        self.civil_datetime(t)
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_else(|| "??:??".into())
    }
}

/// Calendar backed by a chrono timezone (`Utc`, `Local`, `FixedOffset`, or a
/// `chrono_tz::Tz`).
#[derive(Debug, Clone)]
pub struct Zoned<Tz> {
    zone: Tz,
}

impl<Tz: TimeZone> Zoned<Tz> {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Zoned<Utc> {
    pub fn utc() -> Self {
        Self::new(Utc)
    }
}

impl Zoned<chrono::Local> {
    pub fn local() -> Self {
        Self::new(chrono::Local)
    }
}

impl<Tz> CivilCalendar for Zoned<Tz>
where
    Tz: TimeZone + Send + Sync,
{
    fn instant(&self, date: NaiveDate, minute: u32) -> Result<Ms, SlotError> {
        let nonexistent = || SlotError::NonexistentLocalTime { date, minute };
        let (day, minute_of_day) = if minute >= MINUTES_PER_DAY {
            (date.succ_opt().ok_or_else(nonexistent)?, minute - MINUTES_PER_DAY)
        } else {
            (date, minute)
        };
        let time = NaiveTime::from_hms_opt(minute_of_day / 60, minute_of_day % 60, 0)
            .ok_or_else(nonexistent)?;
        match self.zone.from_local_datetime(&day.and_time(time)) {
            LocalResult::Single(dt) => Ok(dt.timestamp_millis()),
            // Clocks fall back: take the first occurrence.
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.timestamp_millis()),
            LocalResult::None => Err(nonexistent()),
        }
    }

    fn civil_datetime(&self, t: Ms) -> Option<NaiveDateTime> {
        self.zone.timestamp_millis_opt(t).single().map(|dt| dt.naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn utc_instant_and_back() {
        let cal = Zoned::utc();
        let t = cal.instant(date(2024, 6, 3), 7 * 60).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 6, 3, 7, 0, 0).unwrap().timestamp_millis());
        assert_eq!(cal.civil_date(t), Some(date(2024, 6, 3)));
        assert_eq!(cal.label(t), "07:00");
    }

    #[test]
    fn end_of_day_midnight_is_next_day() {
        let cal = Zoned::utc();
        let t = cal.instant(date(2024, 6, 3), MINUTES_PER_DAY).unwrap();
        assert_eq!(t, cal.instant(date(2024, 6, 4), 0).unwrap());
        assert_eq!(cal.civil_date(t), Some(date(2024, 6, 4)));
    }

    #[test]
    fn zoned_day_differs_from_utc_day() {
        let cal = Zoned::new(chrono_tz::Europe::Madrid);
        // 07:00 in Madrid in June is 05:00 UTC.
        let t = cal.instant(date(2024, 6, 3), 7 * 60).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 6, 3, 5, 0, 0).unwrap().timestamp_millis());

        // 23:30 UTC on the 3rd is already the 4th in Madrid.
        let late = Utc.with_ymd_and_hms(2024, 6, 3, 23, 30, 0).unwrap().timestamp_millis();
        assert_eq!(cal.civil_date(late), Some(date(2024, 6, 4)));
        assert_eq!(Zoned::utc().civil_date(late), Some(date(2024, 6, 3)));
    }

    #[test]
    fn spring_forward_gap_is_an_error() {
        let cal = Zoned::new(chrono_tz::Europe::Madrid);
        let err = cal.instant(date(2024, 3, 31), 2 * 60 + 30).unwrap_err();
        assert!(matches!(err, SlotError::NonexistentLocalTime { minute: 150, .. }));
    }

    #[test]
    fn fall_back_takes_first_occurrence() {
        let cal = Zoned::new(chrono_tz::Europe::Madrid);
        // 02:30 happens twice on 2024-10-27; the first is still CEST (UTC+2).
        let t = cal.instant(date(2024, 10, 27), 2 * 60 + 30).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap().timestamp_millis());
    }
}
