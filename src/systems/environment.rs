use crate::{
    config::EnvironmentRates,
    engine::{System, SystemContext},
    garden::{clamp_vital, Garden},
    rng::SystemRng,
    weather::WeatherTag,
};

/// Per-minute linear rules for the plant's vitals, driven by the effective
/// weather tag and the player's window/incident state.
pub struct EnvironmentSystem {
    rates: EnvironmentRates,
}

impl EnvironmentSystem {
    pub fn new(rates: EnvironmentRates) -> Self {
        Self { rates }
    }

    fn humidity_rate(&self, tag: WeatherTag, window_open: bool) -> f64 {
        if tag == WeatherTag::Rain && window_open {
            self.rates.humidity_rain_window_open
        } else {
            self.rates.humidity_drift.for_tag(tag)
        }
    }
}

impl Default for EnvironmentSystem {
    fn default() -> Self {
        Self::new(EnvironmentRates::default())
    }
}

impl System for EnvironmentSystem {
    fn name(&self) -> &str {
        "environment"
    }

    fn run(&mut self, ctx: &SystemContext, garden: &mut Garden, _rng: &mut SystemRng<'_>) {
        let minutes = ctx.dt / 60.0;
        let tag = garden.effective_tag;

        let moisture_loss = self.rates.moisture_loss.for_tag(tag) * minutes;
        garden.vitals.moisture = clamp_vital(garden.vitals.moisture - moisture_loss);

        garden.temperature_carry += self.rates.temperature_drift.for_tag(tag) * minutes;
        let whole = garden.temperature_carry.trunc();
        garden.temperature_carry -= whole;
        let room = garden.room_temperature.saturating_add(whole as i32);
        garden.set_room_temperature(room);

        let humidity_delta = self.humidity_rate(tag, garden.flags.window_open) * minutes;
        garden.vitals.humidity = clamp_vital(garden.vitals.humidity + humidity_delta);

        let mut happiness_loss = 0.0;
        if garden.incidents.has_pest {
            happiness_loss += self.rates.pest_happiness_loss;
        }
        if garden.incidents.has_mold {
            happiness_loss += self.rates.mold_happiness_loss;
        }
        garden.vitals.happiness = clamp_vital(garden.vitals.happiness - happiness_loss * minutes);

        garden.vitals.nutrition =
            clamp_vital(garden.vitals.nutrition - self.rates.nutrition_drain * minutes);

        garden.refresh_diagnostics();
    }
}
