use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};
use tracing::info;

use crate::{
    config::WeatherEventConfig,
    engine::{System, SystemContext},
    garden::{Garden, SimEvent},
    rng::SystemRng,
    weather::WeatherTag,
};

/// Rolls for random weather events once the cooldown has elapsed and
/// expires the active one.
pub struct WeatherEventSystem {
    config: WeatherEventConfig,
}

impl WeatherEventSystem {
    pub fn new(config: WeatherEventConfig) -> Self {
        Self { config }
    }

    fn pick_tag(&self, rng: &mut SystemRng<'_>) -> Option<WeatherTag> {
        let entries = self.config.weights.entries();
        let index = WeightedIndex::new(entries.iter().map(|(_, weight)| *weight)).ok()?;
        Some(entries[index.sample(rng)].0)
    }

    fn pick_duration(&self, rng: &mut SystemRng<'_>) -> f64 {
        let (min, max) = self.config.duration_range_secs();
        if max > min {
            rng.gen_range(min..=max)
        } else {
            min
        }
    }
}

impl Default for WeatherEventSystem {
    fn default() -> Self {
        Self::new(WeatherEventConfig::default())
    }
}

impl System for WeatherEventSystem {
    fn name(&self) -> &str {
        "weather_events"
    }

    fn run(&mut self, ctx: &SystemContext, garden: &mut Garden, rng: &mut SystemRng<'_>) {
        if garden.weather_event.can_roll() {
            let chance = (self.config.trigger_chance_per_sec.max(0.0) * ctx.dt).min(1.0);
            let roll: f64 = rng.gen();
            if roll >= chance {
                return;
            }
            let Some(tag) = self.pick_tag(rng) else {
                return;
            };
            let duration = self.pick_duration(rng);
            let mut effective = garden.effective_tag;
            if garden.weather_event.trigger(tag, duration, &mut effective) {
                garden.effective_tag = effective;
                info!(%tag, duration, "weather event started");
                garden
                    .events
                    .push(SimEvent::WeatherEventStarted { tag, duration });
            }
            return;
        }

        let mut effective = garden.effective_tag;
        let ended = garden
            .weather_event
            .advance(ctx.dt, &mut effective, self.config.cooldown_secs);
        garden.effective_tag = effective;
        if let Some(event) = ended {
            info!(tag = %event.tag, restored = %event.saved_tag, "weather event ended");
            garden.events.push(SimEvent::WeatherEventEnded {
                tag: event.tag,
                restored: event.saved_tag,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SessionConfig,
        plant::PlantCatalogue,
        rng::RngManager,
        weather::{TimeOfDay, WeatherSnapshot},
    };

    fn garden(config: &SessionConfig) -> Garden {
        let catalogue =
            PlantCatalogue::from_json(r#"[{"id": "ivy", "min_temp": 15, "max_temp": 25}]"#)
                .unwrap();
        Garden::new(
            catalogue.get(0).unwrap(),
            config,
            WeatherSnapshot::new(WeatherTag::Cloudy),
            TimeOfDay::Day,
        )
    }

    fn step(system: &mut WeatherEventSystem, garden: &mut Garden, rng: &mut RngManager, dt: f64) {
        let ctx = SystemContext {
            frame: 0,
            dt,
            seconds_of_day: 0,
        };
        system.run(&ctx, garden, &mut rng.stream("weather_events"));
    }

    #[test]
    fn never_fires_during_initial_cooldown() {
        let mut config = SessionConfig::default();
        config.weather_events.trigger_chance_per_sec = 1.0;
        let mut g = garden(&config);
        let mut system = WeatherEventSystem::new(config.weather_events.clone());
        let mut rng = RngManager::new(5);
        for _ in 0..19 {
            step(&mut system, &mut g, &mut rng, 1.0);
        }
        assert!(!g.weather_event.is_active());
        step(&mut system, &mut g, &mut rng, 1.0);
        step(&mut system, &mut g, &mut rng, 1.0);
        assert!(g.weather_event.is_active());
    }

    #[test]
    fn event_expires_and_restores_previous_tag() {
        let mut config = SessionConfig::default();
        config.weather_events.initial_cooldown_secs = 0.0;
        config.weather_events.trigger_chance_per_sec = 1.0;
        config.weather_events.weights.rain = 0.0;
        config.weather_events.weights.cloudy = 0.0;
        config.weather_events.weights.clear = 0.0;
        let mut g = garden(&config);
        let mut system = WeatherEventSystem::new(config.weather_events.clone());
        let mut rng = RngManager::new(11);

        step(&mut system, &mut g, &mut rng, 1.0);
        let event = *g.weather_event.active().expect("event starts");
        assert_eq!(event.tag, WeatherTag::Snow);
        assert_eq!(event.saved_tag, WeatherTag::Cloudy);
        assert!((20.0..=40.0).contains(&event.remaining));
        assert_eq!(g.effective_tag, WeatherTag::Snow);

        for _ in 0..41 {
            step(&mut system, &mut g, &mut rng, 1.0);
            if !g.weather_event.is_active() {
                break;
            }
        }
        assert!(!g.weather_event.is_active());
        assert_eq!(g.effective_tag, WeatherTag::Cloudy);
        assert!(g
            .drain_events()
            .contains(&SimEvent::WeatherEventEnded {
                tag: WeatherTag::Snow,
                restored: WeatherTag::Cloudy,
            }));
        assert!(!g.weather_event.can_roll(), "post-event cooldown armed");
    }

    #[test]
    fn zero_chance_never_fires() {
        let mut config = SessionConfig::default();
        config.weather_events.initial_cooldown_secs = 0.0;
        config.weather_events.trigger_chance_per_sec = 0.0;
        let mut g = garden(&config);
        let mut system = WeatherEventSystem::new(config.weather_events.clone());
        let mut rng = RngManager::new(3);
        for _ in 0..10_000 {
            step(&mut system, &mut g, &mut rng, 1.0);
        }
        assert!(!g.weather_event.is_active());
    }

    #[test]
    fn all_zero_weights_never_fire() {
        let mut config = SessionConfig::default();
        config.weather_events.initial_cooldown_secs = 0.0;
        config.weather_events.trigger_chance_per_sec = 1.0;
        config.weather_events.weights = crate::config::EventWeights {
            rain: 0.0,
            cloudy: 0.0,
            snow: 0.0,
            clear: 0.0,
        };
        let mut g = garden(&config);
        let mut system = WeatherEventSystem::new(config.weather_events.clone());
        let mut rng = RngManager::new(3);
        step(&mut system, &mut g, &mut rng, 1.0);
        assert!(!g.weather_event.is_active());
    }
}
