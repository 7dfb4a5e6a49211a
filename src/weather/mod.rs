//! Real-world weather as seen by the simulation: the tag used by the tick
//! rules, the snapshot published by the external weather feed, and the
//! line-oriented state file that feed writes.

pub mod daypart;
pub mod event;
pub mod source;

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use daypart::{classify, DaypartWindows, TimeOfDay};
pub use event::{ActiveWeatherEvent, WeatherEventState};
pub use source::{
    fetch_with_timeout, spawn_weather_poller, FileWeatherSource, StaticWeatherSource,
    WeatherMailbox, WeatherSource,
};

pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;
pub const DEFAULT_SUNRISE_SECS: u32 = 6 * 60 * 60;
pub const DEFAULT_SUNSET_SECS: u32 = 18 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherTag {
    #[default]
    Unknown,
    Clear,
    Cloudy,
    Rain,
    Snow,
    Storm,
}

impl WeatherTag {
    /// Maps a provider condition name ("Clouds", "Drizzle", ...) onto a tag.
    pub fn from_provider_main(main: &str) -> Self {
        match main.trim().to_ascii_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" | "mist" | "haze" | "fog" | "smoke" => Self::Cloudy,
            "rain" | "drizzle" => Self::Rain,
            "snow" => Self::Snow,
            "thunderstorm" | "tornado" | "squall" => Self::Storm,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Clear => "CLEAR",
            Self::Cloudy => "CLOUDY",
            Self::Rain => "RAIN",
            Self::Snow => "SNOW",
            Self::Storm => "STORM",
        }
    }
}

impl FromStr for WeatherTag {
    type Err = std::convert::Infallible;

    /// State-file tags. Anything unrecognised is `Unknown`, never an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "CLEAR" => Self::Clear,
            "CLOUDY" => Self::Cloudy,
            "RAIN" => Self::Rain,
            "SNOW" => Self::Snow,
            "STORM" => Self::Storm,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for WeatherTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather state io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("weather state is missing {0}")]
    MissingField(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("weather fetch timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("weather worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub tag: WeatherTag,
    pub temperature: f64,
    pub humidity: f64,
    pub raw: String,
    pub sunrise_seconds: u32,
    pub sunset_seconds: u32,
    /// Unix timestamps as reported by the provider, when present.
    pub sunrise_ts: Option<i64>,
    pub sunset_ts: Option<i64>,
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self {
            tag: WeatherTag::Unknown,
            temperature: 0.0,
            humidity: 0.0,
            raw: String::new(),
            sunrise_seconds: DEFAULT_SUNRISE_SECS,
            sunset_seconds: DEFAULT_SUNSET_SECS,
            sunrise_ts: None,
            sunset_ts: None,
        }
    }
}

impl WeatherSnapshot {
    pub fn new(tag: WeatherTag) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn with_sun(mut self, sunrise_seconds: u32, sunset_seconds: u32) -> Self {
        self.sunrise_seconds = sunrise_seconds.min(SECONDS_PER_DAY);
        self.sunset_seconds = sunset_seconds.min(SECONDS_PER_DAY);
        self
    }

    /// Parses the `KEY=VALUE` state file written by the weather script.
    ///
    /// `TAG` is required; numeric fields must parse when present. Unknown keys
    /// are skipped. Sunrise/sunset come from the wall-clock strings, then from
    /// the `*_TS` timestamps in local time, then fall back to 06:00/18:00.
    pub fn parse_state(text: &str) -> Result<Self, WeatherError> {
        let mut tag = None;
        let mut sunrise_clock = None;
        let mut sunset_clock = None;
        let mut snapshot = Self::default();
        for line in text.lines() {
            let line = line.trim();
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "TAG" => tag = Some(value.parse::<WeatherTag>().unwrap_or_default()),
                "TEMP" => snapshot.temperature = parse_number("TEMP", value)?,
                "HUMIDITY" => snapshot.humidity = parse_number("HUMIDITY", value)?,
                "RAW" => snapshot.raw = value.to_string(),
                "SUNRISE_TS" => {
                    snapshot.sunrise_ts = Some(parse_timestamp("SUNRISE_TS", value)?)
                }
                "SUNSET_TS" => snapshot.sunset_ts = Some(parse_timestamp("SUNSET_TS", value)?),
                "SUNRISE" => sunrise_clock = seconds_of_day(value),
                "SUNSET" => sunset_clock = seconds_of_day(value),
                _ => {}
            }
        }
        snapshot.tag = tag.ok_or(WeatherError::MissingField("TAG"))?;
        snapshot.sunrise_seconds = sunrise_clock
            .or_else(|| snapshot.sunrise_ts.and_then(local_seconds_of_day))
            .unwrap_or(DEFAULT_SUNRISE_SECS);
        snapshot.sunset_seconds = sunset_clock
            .or_else(|| snapshot.sunset_ts.and_then(local_seconds_of_day))
            .unwrap_or(DEFAULT_SUNSET_SECS);
        Ok(snapshot)
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<f64, WeatherError> {
    value
        .parse::<f64>()
        .map_err(|_| WeatherError::InvalidValue {
            key,
            value: value.to_string(),
        })
}

fn parse_timestamp(key: &'static str, value: &str) -> Result<i64, WeatherError> {
    value.parse::<i64>().map_err(|_| WeatherError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Seconds since local midnight for a unix timestamp.
pub fn local_seconds_of_day(ts: i64) -> Option<u32> {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|time| time.num_seconds_from_midnight())
}

/// Converts a local wall-clock string (`"YYYY-MM-DD HH:MM:SS"` or `HH:MM[:SS]`,
/// optionally quoted) to seconds since midnight.
pub fn seconds_of_day(value: &str) -> Option<u32> {
    let value = value.trim().trim_matches('"');
    let time = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.time())
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()?;
    Some(time.num_seconds_from_midnight())
}
