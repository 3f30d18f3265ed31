use std::sync::Arc;

use crate::calendar::{CivilCalendar, Zoned};
use crate::engine::SlotError;
use crate::hours::{BusinessHours, SlotPolicy};
use crate::model::Ms;
use crate::notify::NoticeHub;

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}

/// Saturates instead of wrapping past `Ms::MAX`.
fn duration_ms(d: std::time::Duration) -> Ms {
    Ms::try_from(d.as_millis()).unwrap_or(Ms::MAX)
}

/// Source of "now" for the past-slot filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    Fixed(Ms),
}

impl Clock {
    pub fn now(&self) -> Ms {
        match self {
            Clock::System => now_ms(),
            Clock::Fixed(t) => *t,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Slot(SlotError),
    UnknownTimezone(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Slot(e) => write!(f, "{e}"),
            ConfigError::UnknownTimezone(tz) => write!(f, "unknown timezone: {tz}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<SlotError> for ConfigError {
    fn from(e: SlotError) -> Self {
        ConfigError::Slot(e)
    }
}

/// Raw settings, usually read from `CLASSLOT_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub open_hour: u32,
    pub close_hour: u32,
    pub saturday_close_hour: u32,
    pub slot_minutes: u32,
    /// IANA zone name; `None` uses the host's local zone.
    pub timezone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            open_hour: 7,
            close_hour: 22,
            saturday_close_hour: 12,
            slot_minutes: 60,
            timezone: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str, default: u32| lookup(key).and_then(|s| s.parse().ok()).unwrap_or(default);
        Self {
            open_hour: number("CLASSLOT_OPEN_HOUR", defaults.open_hour),
            close_hour: number("CLASSLOT_CLOSE_HOUR", defaults.close_hour),
            saturday_close_hour: number("CLASSLOT_SATURDAY_CLOSE_HOUR", defaults.saturday_close_hour),
            slot_minutes: number("CLASSLOT_SLOT_MINUTES", defaults.slot_minutes),
            timezone: lookup("CLASSLOT_TZ").filter(|s| !s.is_empty()),
        }
    }

    pub fn policy(&self) -> Result<SlotPolicy, SlotError> {
        let hours = BusinessHours::weekly(self.open_hour, self.close_hour, self.saturday_close_hour)?;
        SlotPolicy::new(hours, self.slot_minutes)
    }

    pub fn calendar(&self) -> Result<Arc<dyn CivilCalendar>, ConfigError> {
        match &self.timezone {
            Some(name) => {
                let tz: chrono_tz::Tz = name
                    .parse()
                    .map_err(|_| ConfigError::UnknownTimezone(name.clone()))?;
                Ok(Arc::new(Zoned::new(tz)))
            }
            None => Ok(Arc::new(Zoned::local())),
        }
    }
}

/// Everything the board needs, built once and shared by reference.
pub struct AppContext {
    pub policy: SlotPolicy,
    pub calendar: Arc<dyn CivilCalendar>,
    pub clock: Clock,
    pub notices: Arc<NoticeHub>,
}

impl AppContext {
    pub fn new(policy: SlotPolicy, calendar: Arc<dyn CivilCalendar>, clock: Clock) -> Self {
        Self {
            policy,
            calendar,
            clock,
            notices: Arc::new(NoticeHub::new()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.policy()?, config.calendar()?, Clock::System))
    }

    pub fn now(&self) -> Ms {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.policy().unwrap(), SlotPolicy::default());
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let config = Config::from_lookup(lookup(&[
            ("CLASSLOT_OPEN_HOUR", "6"),
            ("CLASSLOT_CLOSE_HOUR", "24"),
            ("CLASSLOT_SLOT_MINUTES", "45"),
            ("CLASSLOT_SATURDAY_CLOSE_HOUR", "noon"),
            ("CLASSLOT_TZ", "America/Santiago"),
        ]));
        assert_eq!(config.open_hour, 6);
        assert_eq!(config.close_hour, 24);
        assert_eq!(config.slot_minutes, 45);
        assert_eq!(config.saturday_close_hour, 12);
        assert_eq!(config.timezone.as_deref(), Some("America/Santiago"));
        assert!(config.calendar().is_ok());
    }

    #[test]
    fn inverted_hours_fail() {
        let config = Config::from_lookup(lookup(&[("CLASSLOT_OPEN_HOUR", "23")]));
        assert!(matches!(
            AppContext::from_config(&config),
            Err(ConfigError::Slot(SlotError::InvalidHours { .. }))
        ));
    }

    #[test]
    fn unknown_timezone_fails() {
        let config = Config::from_lookup(lookup(&[("CLASSLOT_TZ", "Mars/Olympus")]));
        assert!(matches!(config.calendar(), Err(ConfigError::UnknownTimezone(_))));
    }

    #[test]
    fn duration_conversion_saturates() {
        assert_eq!(duration_ms(std::time::Duration::from_secs(2)), 2_000);
        assert_eq!(duration_ms(std::time::Duration::MAX), Ms::MAX);
    }

    #[test]
    fn fixed_clock() {
        assert_eq!(Clock::Fixed(42).now(), 42);
        assert!(Clock::System.now() > 0);
    }
}
