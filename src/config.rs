use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::weather::WeatherTag;

fn default_seed() -> u64 {
    7
}

fn default_refresh_interval_secs() -> f64 {
    300.0
}

fn default_fetch_timeout_secs() -> f64 {
    5.0
}

fn default_state_file() -> PathBuf {
    PathBuf::from("assets/weather_state.txt")
}

fn default_poll_interval_secs() -> f64 {
    10.0
}

fn default_fade_secs() -> f64 {
    2.0
}

fn default_half_hour() -> u32 {
    30 * 60
}

fn default_hour() -> u32 {
    60 * 60
}

fn default_event_cooldown_secs() -> f64 {
    20.0
}

fn default_trigger_chance() -> f64 {
    0.0001
}

fn default_min_minutes() -> f64 {
    1.0
}

fn default_max_minutes() -> f64 {
    2.0
}

fn default_seconds_per_minute() -> f64 {
    20.0
}

fn default_exp_multiplier() -> f64 {
    1.5
}

fn default_incident_chance() -> f64 {
    0.0005
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub weather: WeatherFeedConfig,
    #[serde(default)]
    pub daylight: DaylightConfig,
    #[serde(default)]
    pub weather_events: WeatherEventConfig,
    #[serde(default)]
    pub incidents: IncidentConfig,
    #[serde(default)]
    pub rates: EnvironmentRates,
    #[serde(default)]
    pub care: CareConfig,
    #[serde(default)]
    pub experience: ExperienceConfig,
    #[serde(default)]
    pub initial: InitialVitals,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            weather: WeatherFeedConfig::default(),
            daylight: DaylightConfig::default(),
            weather_events: WeatherEventConfig::default(),
            incidents: IncidentConfig::default(),
            rates: EnvironmentRates::default(),
            care: CareConfig::default(),
            experience: ExperienceConfig::default(),
            initial: InitialVitals::default(),
        }
    }
}

impl SessionConfig {
    /// Config with every stochastic source switched off. Useful for
    /// scripted sessions where only player actions should change state.
    pub fn calm() -> Self {
        let mut config = Self::default();
        config.weather_events.trigger_chance_per_sec = 0.0;
        config.incidents.pest_chance_per_sec = 0.0;
        config.incidents.mold_chance_per_sec = 0.0;
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherFeedConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: f64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: f64,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl WeatherFeedConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_interval_secs.max(1.0))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.fetch_timeout_secs.max(0.1))
    }
}

impl Default for WeatherFeedConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            state_file: default_state_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaylightConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: f64,
    #[serde(default = "default_fade_secs")]
    pub fade_secs: f64,
    #[serde(default = "default_half_hour")]
    pub sunrise_lead_secs: u32,
    #[serde(default = "default_hour")]
    pub sunrise_tail_secs: u32,
    #[serde(default = "default_hour")]
    pub sunset_lead_secs: u32,
    #[serde(default = "default_half_hour")]
    pub sunset_tail_secs: u32,
}

impl Default for DaylightConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            fade_secs: default_fade_secs(),
            sunrise_lead_secs: default_half_hour(),
            sunrise_tail_secs: default_hour(),
            sunset_lead_secs: default_hour(),
            sunset_tail_secs: default_half_hour(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventWeights {
    pub rain: f64,
    pub cloudy: f64,
    pub snow: f64,
    pub clear: f64,
}

impl EventWeights {
    pub fn entries(&self) -> [(WeatherTag, f64); 4] {
        [
            (WeatherTag::Rain, self.rain.max(0.0)),
            (WeatherTag::Cloudy, self.cloudy.max(0.0)),
            (WeatherTag::Snow, self.snow.max(0.0)),
            (WeatherTag::Clear, self.clear.max(0.0)),
        ]
    }
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            rain: 20.0,
            cloudy: 20.0,
            snow: 20.0,
            clear: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherEventConfig {
    #[serde(default = "default_event_cooldown_secs")]
    pub initial_cooldown_secs: f64,
    #[serde(default = "default_event_cooldown_secs")]
    pub cooldown_secs: f64,
    #[serde(default = "default_trigger_chance")]
    pub trigger_chance_per_sec: f64,
    #[serde(default = "default_min_minutes")]
    pub min_minutes: f64,
    #[serde(default = "default_max_minutes")]
    pub max_minutes: f64,
    /// Game seconds per event "minute".
    #[serde(default = "default_seconds_per_minute")]
    pub seconds_per_minute: f64,
    #[serde(default = "default_exp_multiplier")]
    pub exp_multiplier: f64,
    #[serde(default)]
    pub weights: EventWeights,
}

impl WeatherEventConfig {
    /// Event duration bounds in seconds, ordered and non-negative.
    pub fn duration_range_secs(&self) -> (f64, f64) {
        let a = self.min_minutes.max(0.0) * self.seconds_per_minute.max(0.0);
        let b = self.max_minutes.max(0.0) * self.seconds_per_minute.max(0.0);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl Default for WeatherEventConfig {
    fn default() -> Self {
        Self {
            initial_cooldown_secs: default_event_cooldown_secs(),
            cooldown_secs: default_event_cooldown_secs(),
            trigger_chance_per_sec: default_trigger_chance(),
            min_minutes: default_min_minutes(),
            max_minutes: default_max_minutes(),
            seconds_per_minute: default_seconds_per_minute(),
            exp_multiplier: default_exp_multiplier(),
            weights: EventWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentConfig {
    #[serde(default = "default_incident_chance")]
    pub pest_chance_per_sec: f64,
    #[serde(default = "default_incident_chance")]
    pub mold_chance_per_sec: f64,
}

impl Default for IncidentConfig {
    fn default() -> Self {
        Self {
            pest_chance_per_sec: default_incident_chance(),
            mold_chance_per_sec: default_incident_chance(),
        }
    }
}

/// One per-minute rate for each weather tag. `other` covers Unknown and Storm.
/// Tags missing from a partial table get a rate of zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagRates {
    pub clear: f64,
    pub cloudy: f64,
    pub rain: f64,
    pub snow: f64,
    pub other: f64,
}

impl TagRates {
    pub fn for_tag(&self, tag: WeatherTag) -> f64 {
        match tag {
            WeatherTag::Clear => self.clear,
            WeatherTag::Cloudy => self.cloudy,
            WeatherTag::Rain => self.rain,
            WeatherTag::Snow => self.snow,
            WeatherTag::Unknown | WeatherTag::Storm => self.other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentRates {
    pub moisture_loss: TagRates,
    pub temperature_drift: TagRates,
    /// Humidity drift; the `rain` entry applies while the window is closed.
    pub humidity_drift: TagRates,
    pub humidity_rain_window_open: f64,
    pub pest_happiness_loss: f64,
    pub mold_happiness_loss: f64,
    pub nutrition_drain: f64,
}

impl Default for EnvironmentRates {
    fn default() -> Self {
        Self {
            moisture_loss: TagRates {
                clear: 10.0,
                cloudy: 8.0,
                rain: 5.0,
                snow: 6.0,
                other: 8.0,
            },
            temperature_drift: TagRates {
                clear: 0.5,
                cloudy: 0.0,
                rain: 0.0,
                snow: -0.5,
                other: 0.0,
            },
            humidity_drift: TagRates {
                clear: -2.0,
                cloudy: 0.0,
                rain: 1.0,
                snow: 0.0,
                other: 0.0,
            },
            humidity_rain_window_open: 3.0,
            pest_happiness_loss: 3.0,
            mold_happiness_loss: 4.0,
            nutrition_drain: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CareConfig {
    pub water_amount: f64,
    pub fertilize_amount: f64,
    pub resolve_happiness_bonus: f64,
    pub nutrition_ok_min: f64,
    pub moisture_tolerance: f64,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            water_amount: 10.0,
            fertilize_amount: 20.0,
            resolve_happiness_bonus: 10.0,
            nutrition_ok_min: 40.0,
            moisture_tolerance: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub water: f64,
    pub kill_pest: f64,
    pub remove_mold: f64,
    pub fertilize: f64,
    pub temperature: f64,
    pub exp_per_level: f64,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            water: 1.0,
            kill_pest: 10.0,
            remove_mold: 12.0,
            fertilize: 5.0,
            temperature: 3.0,
            exp_per_level: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialVitals {
    pub moisture: f64,
    pub room_temperature: i32,
    pub humidity: f64,
    pub happiness: f64,
    pub nutrition: f64,
}

impl Default for InitialVitals {
    fn default() -> Self {
        Self {
            moisture: 60.0,
            room_temperature: 22,
            humidity: 50.0,
            happiness: 80.0,
            nutrition: 70.0,
        }
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<SessionConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}
