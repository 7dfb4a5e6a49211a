use serde::{Deserialize, Serialize};

use crate::{
    config::{CareConfig, SessionConfig},
    plant::{PlantBounds, PlantRecord},
    progression::Progression,
    weather::{TimeOfDay, WeatherEventState, WeatherSnapshot, WeatherTag},
};

pub const VITAL_MIN: f64 = 0.0;
pub const VITAL_MAX: f64 = 100.0;
pub const LAMP_LEVEL_MAX: u8 = 2;

pub fn clamp_vital(value: f64) -> f64 {
    value.clamp(VITAL_MIN, VITAL_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub moisture: f64,
    /// Display mirror of the room temperature, clamped like every vital.
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub happiness: f64,
    pub nutrition: f64,
}

/// Read-only comparison of the vitals against the plant's bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub moisture_ok: bool,
    pub temp_ok: bool,
    pub humidity_ok: bool,
    pub nutrition_ok: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareFlags {
    pub window_open: bool,
    pub lamp_on: bool,
    pub lamp_level: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incidents {
    pub has_pest: bool,
    pub has_mold: bool,
}

/// Cosmetic cross-fade between two day-parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaypartFade {
    pub from: TimeOfDay,
    pub to: TimeOfDay,
    pub remaining: f64,
    pub duration: f64,
}

impl DaypartFade {
    pub fn blend(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    WeatherApplied { tag: WeatherTag },
    WeatherEventStarted { tag: WeatherTag, duration: f64 },
    WeatherEventEnded { tag: WeatherTag, restored: WeatherTag },
    TimeOfDayChanged { from: TimeOfDay, to: TimeOfDay },
    PestAppeared,
    MoldAppeared,
}

/// All mutable state of one gameplay session.
#[derive(Debug, Clone)]
pub struct Garden {
    pub plant_id: String,
    pub bounds: PlantBounds,
    pub vitals: Vitals,
    /// Signed room temperature in whole degrees.
    pub room_temperature: i32,
    /// Sub-degree drift not yet folded into `room_temperature`.
    pub temperature_carry: f64,
    pub diagnostics: Diagnostics,
    pub flags: CareFlags,
    pub incidents: Incidents,
    pub progression: Progression,
    pub weather: WeatherSnapshot,
    pub effective_tag: WeatherTag,
    pub weather_event: WeatherEventState,
    pub time_of_day: TimeOfDay,
    pub fade: Option<DaypartFade>,
    pub events: Vec<SimEvent>,
    care: CareConfig,
}

impl Garden {
    pub fn new(
        plant: &PlantRecord,
        config: &SessionConfig,
        weather: WeatherSnapshot,
        time_of_day: TimeOfDay,
    ) -> Self {
        let initial = &config.initial;
        let mut garden = Self {
            plant_id: plant.id.clone(),
            bounds: plant.bounds(),
            vitals: Vitals {
                moisture: clamp_vital(initial.moisture),
                temperature: clamp_vital(initial.room_temperature as f64),
                humidity: clamp_vital(initial.humidity),
                light: 0.0,
                happiness: clamp_vital(initial.happiness),
                nutrition: clamp_vital(initial.nutrition),
            },
            room_temperature: initial.room_temperature,
            temperature_carry: 0.0,
            diagnostics: Diagnostics::default(),
            flags: CareFlags::default(),
            incidents: Incidents::default(),
            progression: Progression::new(config.experience.exp_per_level),
            effective_tag: weather.tag,
            weather,
            weather_event: WeatherEventState::idle(config.weather_events.initial_cooldown_secs),
            time_of_day,
            fade: None,
            events: Vec::new(),
            care: config.care.clone(),
        };
        garden.refresh_diagnostics();
        garden
    }

    pub fn refresh_diagnostics(&mut self) {
        let bounds = &self.bounds;
        let room = self.room_temperature as f64;
        self.diagnostics = Diagnostics {
            moisture_ok: (self.vitals.moisture - bounds.moisture_opt).abs()
                <= self.care.moisture_tolerance,
            temp_ok: room >= bounds.temp_min && room <= bounds.temp_max,
            humidity_ok: self.vitals.humidity >= bounds.humidity_min
                && self.vitals.humidity <= bounds.humidity_max,
            nutrition_ok: self.vitals.nutrition >= self.care.nutrition_ok_min,
        };
    }

    pub fn set_room_temperature(&mut self, degrees: i32) {
        self.room_temperature = degrees;
        self.vitals.temperature = clamp_vital(degrees as f64);
    }

    pub fn sync_light(&mut self) {
        let level = if self.flags.lamp_on {
            self.flags.lamp_level.min(LAMP_LEVEL_MAX)
        } else {
            0
        };
        self.vitals.light = clamp_vital(level as f64 * VITAL_MAX / LAMP_LEVEL_MAX as f64);
    }

    /// Installs a freshly polled snapshot. The effective tag follows the real
    /// weather only while no weather event is overriding it.
    pub fn apply_weather(&mut self, snapshot: WeatherSnapshot) {
        if !self.weather_event.is_active() {
            self.effective_tag = snapshot.tag;
        }
        self.events.push(SimEvent::WeatherApplied { tag: snapshot.tag });
        self.weather = snapshot;
    }

    /// Whether the active weather event matches the real weather.
    pub fn event_matches_weather(&self) -> bool {
        self.weather_event
            .active()
            .is_some_and(|event| event.tag == self.weather.tag)
    }

    pub fn daypart_blend(&self) -> f64 {
        self.fade.map_or(1.0, |fade| fade.blend())
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
