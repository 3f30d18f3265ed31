use chrono::Weekday;

use crate::engine::SlotError;
use crate::model::{Ms, MINUTE_MS};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Opening and closing time of one day, in minutes after civil midnight.
/// `close` may be `MINUTES_PER_DAY` (midnight at the end of the day).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    pub open: u32,
    pub close: u32,
}

impl DayHours {
    pub fn new(open: u32, close: u32) -> Result<Self, SlotError> {
        let hours = Self { open, close };
        hours.validate()?;
        Ok(hours)
    }

    pub fn from_hours(open: u32, close: u32) -> Result<Self, SlotError> {
        Self::new(open.saturating_mul(60), close.saturating_mul(60))
    }

    pub fn validate(&self) -> Result<(), SlotError> {
        if self.open >= self.close || self.close > MINUTES_PER_DAY {
            return Err(SlotError::InvalidHours {
                open: self.open,
                close: self.close,
            });
        }
        Ok(())
    }

    pub fn len_minutes(&self) -> u32 {
        self.close - self.open
    }
}

/// Per-weekday opening rules. `None` means the building is closed that day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessHours {
    days: [Option<DayHours>; 7],
}

impl Default for BusinessHours {
    /// Weekdays 07:00–22:00, Saturday 07:00–12:00, Sunday closed.
    fn default() -> Self {
        let weekday = Some(DayHours { open: 7 * 60, close: 22 * 60 });
        let saturday = Some(DayHours { open: 7 * 60, close: 12 * 60 });
        Self {
            days: [weekday, weekday, weekday, weekday, weekday, saturday, None],
        }
    }
}

impl BusinessHours {
    /// Every day closed. Start here and open days with [`BusinessHours::with_day`].
    pub fn closed() -> Self {
        Self { days: [None; 7] }
    }

    /// Monday–Friday share one schedule, Saturday closes early, Sunday is closed.
    pub fn weekly(open_hour: u32, close_hour: u32, saturday_close_hour: u32) -> Result<Self, SlotError> {
        let weekday = DayHours::from_hours(open_hour, close_hour)?;
        let saturday = DayHours::from_hours(open_hour, saturday_close_hour)?;
        Ok(Self::closed()
            .with_days(
                &[Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
                Some(weekday),
            )
            .with_day(Weekday::Sat, Some(saturday)))
    }

    pub fn with_day(mut self, day: Weekday, hours: Option<DayHours>) -> Self {
        self.days[day.num_days_from_monday() as usize] = hours;
        self
    }

    pub fn with_days(mut self, days: &[Weekday], hours: Option<DayHours>) -> Self {
        for day in days {
            self.days[day.num_days_from_monday() as usize] = hours;
        }
        self
    }

    pub fn for_day(&self, day: Weekday) -> Option<DayHours> {
        self.days[day.num_days_from_monday() as usize]
    }

    pub fn is_closed(&self, day: Weekday) -> bool {
        self.for_day(day).is_none()
    }

    pub fn validate(&self) -> Result<(), SlotError> {
        self.days.iter().flatten().try_for_each(DayHours::validate)
    }
}

/// Business hours plus the base slot length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPolicy {
    pub hours: BusinessHours,
    pub slot_minutes: u32,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            hours: BusinessHours::default(),
            slot_minutes: 60,
        }
    }
}

impl SlotPolicy {
    pub fn new(hours: BusinessHours, slot_minutes: u32) -> Result<Self, SlotError> {
        let policy = Self { hours, slot_minutes };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), SlotError> {
        if self.slot_minutes == 0 || self.slot_minutes > MINUTES_PER_DAY {
            return Err(SlotError::InvalidSlotLength(self.slot_minutes));
        }
        self.hours.validate()
    }

    pub fn slot_ms(&self) -> Ms {
        self.slot_minutes as Ms * MINUTE_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_week() {
        let hours = BusinessHours::default();
        assert_eq!(hours.for_day(Weekday::Mon), Some(DayHours { open: 420, close: 1320 }));
        assert_eq!(hours.for_day(Weekday::Fri), Some(DayHours { open: 420, close: 1320 }));
        assert_eq!(hours.for_day(Weekday::Sat), Some(DayHours { open: 420, close: 720 }));
        assert!(hours.is_closed(Weekday::Sun));
        assert!(hours.validate().is_ok());
    }

    #[test]
    fn weekly_matches_default() {
        assert_eq!(BusinessHours::weekly(7, 22, 12).unwrap(), BusinessHours::default());
    }

    #[test]
    fn close_before_open_rejected() {
        let err = DayHours::from_hours(22, 7).unwrap_err();
        assert!(matches!(err, SlotError::InvalidHours { open: 1320, close: 420 }));
        assert!(DayHours::from_hours(8, 8).is_err());
        assert!(BusinessHours::weekly(7, 22, 6).is_err());
    }

    #[test]
    fn midnight_close_allowed_but_not_later() {
        assert!(DayHours::from_hours(6, 24).is_ok());
        assert!(DayHours::from_hours(6, 25).is_err());
    }

    #[test]
    fn hand_built_invalid_day_caught_by_validate() {
        let hours = BusinessHours::closed().with_day(Weekday::Wed, Some(DayHours { open: 600, close: 300 }));
        assert!(hours.validate().is_err());
    }

    #[test]
    fn zero_slot_length_rejected() {
        let err = SlotPolicy::new(BusinessHours::default(), 0).unwrap_err();
        assert!(matches!(err, SlotError::InvalidSlotLength(0)));
        assert_eq!(SlotPolicy::new(BusinessHours::default(), 45).unwrap().slot_ms(), 45 * 60_000);
    }
}
