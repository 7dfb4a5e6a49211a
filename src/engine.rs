use crate::{
    config::SessionConfig,
    garden::Garden,
    rng::{RngManager, SystemRng},
    systems::{DaylightSystem, EnvironmentSystem, IncidentSystem, WeatherEventSystem},
};

pub struct SystemContext {
    pub frame: u64,
    pub dt: f64,
    pub seconds_of_day: u32,
}

/// One stage of the per-frame update. Systems never fail: every rule is a
/// total function of the garden, the elapsed time and the system's stream.
pub trait System: Send {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, garden: &mut Garden, rng: &mut SystemRng<'_>);
}

pub struct EngineBuilder {
    seed: u64,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            systems: Vec::new(),
        }
    }

    /// Registers the standard frame pipeline: weather events, day-part,
    /// environment, incidents.
    pub fn standard(config: &SessionConfig) -> Self {
        Self::new(config.seed)
            .with_system(WeatherEventSystem::new(config.weather_events.clone()))
            .with_system(DaylightSystem::new(config.daylight.clone()))
            .with_system(EnvironmentSystem::new(config.rates.clone()))
            .with_system(IncidentSystem::new(config.incidents.clone()))
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.seed),
            systems: self.systems,
            frame: 0,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    frame: u64,
}

impl Engine {
    /// Runs every system once, in registration order.
    pub fn step(&mut self, garden: &mut Garden, dt: f64, seconds_of_day: u32) -> u64 {
        self.frame += 1;
        let ctx = SystemContext {
            frame: self.frame,
            dt,
            seconds_of_day,
        };
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            system.run(&ctx, garden, &mut rng_stream);
        }
        self.frame
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name()).collect()
    }
}
