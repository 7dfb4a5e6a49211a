use serde::{Deserialize, Serialize};

use crate::config::DaylightConfig;

use super::SECONDS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Night,
    Sunrise,
    Day,
    Sunset,
}

/// Boundaries of the sunrise and sunset windows, in seconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaypartWindows {
    pub sunrise_start: u32,
    pub sunrise_end: u32,
    pub sunset_start: u32,
    pub sunset_end: u32,
}

impl DaypartWindows {
    pub fn new(sunrise_sec: u32, sunset_sec: u32, config: &DaylightConfig) -> Self {
        Self {
            sunrise_start: sunrise_sec.saturating_sub(config.sunrise_lead_secs),
            sunrise_end: sunrise_sec.saturating_add(config.sunrise_tail_secs),
            sunset_start: sunset_sec.saturating_sub(config.sunset_lead_secs),
            sunset_end: sunset_sec
                .saturating_add(config.sunset_tail_secs)
                .min(SECONDS_PER_DAY),
        }
    }

    pub fn classify(&self, now_sec: u32) -> TimeOfDay {
        if now_sec < self.sunrise_start {
            TimeOfDay::Night
        } else if now_sec < self.sunrise_end {
            TimeOfDay::Sunrise
        } else if now_sec < self.sunset_start {
            TimeOfDay::Day
        } else if now_sec < self.sunset_end {
            TimeOfDay::Sunset
        } else {
            TimeOfDay::Night
        }
    }
}

/// Classifies `now_sec` with the default window offsets
/// (sunrise -30min..+60min, sunset -60min..+30min).
pub fn classify(now_sec: u32, sunrise_sec: u32, sunset_sec: u32) -> TimeOfDay {
    DaypartWindows::new(sunrise_sec, sunset_sec, &DaylightConfig::default()).classify(now_sec)
}
