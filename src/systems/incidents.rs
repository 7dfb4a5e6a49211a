use rand::Rng;
use tracing::info;

use crate::{
    config::IncidentConfig,
    engine::{System, SystemContext},
    garden::{Garden, SimEvent},
    rng::SystemRng,
};

/// Independent Bernoulli draws for pests and mold. A hazard that is already
/// present is not re-rolled; only the matching player action clears it.
pub struct IncidentSystem {
    config: IncidentConfig,
}

impl IncidentSystem {
    pub fn new(config: IncidentConfig) -> Self {
        Self { config }
    }
}

impl Default for IncidentSystem {
    fn default() -> Self {
        Self::new(IncidentConfig::default())
    }
}

fn roll(rng: &mut SystemRng<'_>, chance_per_sec: f64, dt: f64) -> bool {
    let chance = (chance_per_sec.max(0.0) * dt).min(1.0);
    rng.gen::<f64>() < chance
}

impl System for IncidentSystem {
    fn name(&self) -> &str {
        "incidents"
    }

    fn run(&mut self, ctx: &SystemContext, garden: &mut Garden, rng: &mut SystemRng<'_>) {
        if !garden.incidents.has_pest && roll(rng, self.config.pest_chance_per_sec, ctx.dt) {
            garden.incidents.has_pest = true;
            info!(frame = ctx.frame, "pests appeared");
            garden.events.push(SimEvent::PestAppeared);
        }
        if !garden.incidents.has_mold && roll(rng, self.config.mold_chance_per_sec, ctx.dt) {
            garden.incidents.has_mold = true;
            info!(frame = ctx.frame, "mold appeared");
            garden.events.push(SimEvent::MoldAppeared);
        }
    }
}
