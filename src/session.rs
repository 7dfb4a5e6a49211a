use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    actions::{ActionDispatcher, ActionOutcome, PlayerAction},
    clock::{Clock, SystemClock},
    config::SessionConfig,
    engine::{Engine, EngineBuilder},
    garden::{CareFlags, Diagnostics, Garden, Incidents, SimEvent, Vitals},
    journal::{ActionJournal, JournalEntry, JournalEvent, NullJournal},
    plant::{PlantBounds, PlantCatalogue},
    weather::{
        DaypartWindows, TimeOfDay, WeatherEventState, WeatherMailbox, WeatherSnapshot, WeatherTag,
    },
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no plant at index {index} (catalogue has {count})")]
    UnknownPlant { index: usize, count: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    pub events: Vec<SimEvent>,
}

/// Everything the HUD shows, copied out of the session.
#[derive(Debug, Clone, Serialize)]
pub struct HudSnapshot {
    pub plant_id: String,
    pub frame: u64,
    pub vitals: Vitals,
    pub room_temperature: i32,
    pub diagnostics: Diagnostics,
    pub incidents: Incidents,
    pub flags: CareFlags,
    pub weather: WeatherTag,
    pub effective_weather: WeatherTag,
    pub weather_event: Option<WeatherTag>,
    pub time_of_day: TimeOfDay,
    pub level: u32,
    pub exp: f64,
}

/// One play-through with a single plant. Owns all simulation state; the
/// host calls [`GameplaySession::tick`] once per frame and
/// [`GameplaySession::apply`] once per input event.
pub struct GameplaySession {
    garden: Garden,
    engine: Engine,
    dispatcher: ActionDispatcher,
    mailbox: WeatherMailbox,
    journal: Box<dyn ActionJournal>,
    clock: Box<dyn Clock>,
    config: SessionConfig,
}

impl GameplaySession {
    /// Starts a session for the plant at `index`. An out-of-range index is
    /// a caller bug and the only way session start can fail.
    pub fn start(
        catalogue: &PlantCatalogue,
        index: usize,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let plant = catalogue.get(index).ok_or(SessionError::UnknownPlant {
            index,
            count: catalogue.len(),
        })?;
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let weather = WeatherSnapshot::default();
        let time_of_day = classify_now(&config, &weather, clock.as_ref());
        let garden = Garden::new(plant, &config, weather, time_of_day);
        info!(plant = %plant.id, seed = config.seed, "gameplay session started");
        Ok(Self {
            garden,
            engine: EngineBuilder::standard(&config).build(),
            dispatcher: ActionDispatcher::new(&config),
            mailbox: WeatherMailbox::new(),
            journal: Box::new(NullJournal),
            clock,
            config,
        })
    }

    pub fn with_journal(mut self, journal: impl ActionJournal + 'static) -> Self {
        self.journal = Box::new(journal);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self.garden.time_of_day = classify_now(&self.config, &self.garden.weather, self.clock.as_ref());
        self
    }

    /// Seeds the session with a known snapshot instead of the built-in default.
    pub fn with_weather(mut self, snapshot: WeatherSnapshot) -> Self {
        self.garden.apply_weather(snapshot);
        self.garden.drain_events();
        self.garden.time_of_day = classify_now(&self.config, &self.garden.weather, self.clock.as_ref());
        self
    }

    /// Advances the simulation by `dt` seconds. Never blocks and never fails;
    /// a negative or non-finite `dt` counts as zero.
    pub fn tick(&mut self, dt: f64) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if let Some(snapshot) = self.mailbox.take() {
            debug!(tag = %snapshot.tag, "weather snapshot applied");
            self.garden.apply_weather(snapshot);
        }
        let now = self.clock.seconds_of_day();
        let frame = self.engine.step(&mut self.garden, dt, now);
        TickReport {
            frame,
            events: self.garden.drain_events(),
        }
    }

    pub fn apply(&mut self, action: PlayerAction) -> ActionOutcome {
        let outcome = self.dispatcher.apply(&mut self.garden, action);
        if outcome.level_ups > 0 {
            info!(level = self.garden.progression.level(), "level up");
        }
        for event in &outcome.journal {
            self.record(event.clone());
        }
        outcome
    }

    /// Requests a weather event; ignored while one is already active.
    pub fn trigger_weather_event(&mut self, tag: WeatherTag, duration_secs: f64) -> bool {
        let mut effective = self.garden.effective_tag;
        let started = self
            .garden
            .weather_event
            .trigger(tag, duration_secs, &mut effective);
        self.garden.effective_tag = effective;
        if started {
            info!(%tag, duration = duration_secs, "weather event started");
            self.garden.events.push(SimEvent::WeatherEventStarted {
                tag,
                duration: duration_secs.max(0.0),
            });
        }
        started
    }

    fn record(&mut self, event: JournalEvent) {
        let entry = JournalEntry::now(event);
        if let Err(err) = self.journal.record(&self.garden.plant_id, entry) {
            warn!(error = %err, plant = %self.garden.plant_id, "failed to write action journal");
        }
    }

    pub fn mailbox(&self) -> WeatherMailbox {
        self.mailbox.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    pub fn plant_id(&self) -> &str {
        &self.garden.plant_id
    }

    pub fn bounds(&self) -> &PlantBounds {
        &self.garden.bounds
    }

    pub fn frame(&self) -> u64 {
        self.engine.frame()
    }

    pub fn vitals(&self) -> &Vitals {
        &self.garden.vitals
    }

    pub fn room_temperature(&self) -> i32 {
        self.garden.room_temperature
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.garden.diagnostics
    }

    pub fn incidents(&self) -> &Incidents {
        &self.garden.incidents
    }

    pub fn flags(&self) -> &CareFlags {
        &self.garden.flags
    }

    pub fn weather(&self) -> &WeatherSnapshot {
        &self.garden.weather
    }

    pub fn effective_tag(&self) -> WeatherTag {
        self.garden.effective_tag
    }

    pub fn weather_event(&self) -> &WeatherEventState {
        &self.garden.weather_event
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        self.garden.time_of_day
    }

    pub fn daypart_blend(&self) -> f64 {
        self.garden.daypart_blend()
    }

    pub fn level(&self) -> u32 {
        self.garden.progression.level()
    }

    pub fn exp(&self) -> f64 {
        self.garden.progression.exp()
    }

    pub fn hud(&self) -> HudSnapshot {
        let garden = &self.garden;
        HudSnapshot {
            plant_id: garden.plant_id.clone(),
            frame: self.engine.frame(),
            vitals: garden.vitals,
            room_temperature: garden.room_temperature,
            diagnostics: garden.diagnostics,
            incidents: garden.incidents,
            flags: garden.flags,
            weather: garden.weather.tag,
            effective_weather: garden.effective_tag,
            weather_event: garden.weather_event.active().map(|event| event.tag),
            time_of_day: garden.time_of_day,
            level: garden.progression.level(),
            exp: garden.progression.exp(),
        }
    }
}

fn classify_now(config: &SessionConfig, weather: &WeatherSnapshot, clock: &dyn Clock) -> TimeOfDay {
    DaypartWindows::new(weather.sunrise_seconds, weather.sunset_seconds, &config.daylight)
        .classify(clock.seconds_of_day())
}
