use tracing::info;

use crate::{
    config::DaylightConfig,
    engine::{System, SystemContext},
    garden::{DaypartFade, Garden, SimEvent},
    rng::SystemRng,
    weather::DaypartWindows,
};

/// Re-classifies the time of day on a fixed polling interval and runs the
/// cross-fade that follows a change.
pub struct DaylightSystem {
    config: DaylightConfig,
    since_poll: f64,
}

impl DaylightSystem {
    pub fn new(config: DaylightConfig) -> Self {
        Self {
            config,
            since_poll: 0.0,
        }
    }
}

impl Default for DaylightSystem {
    fn default() -> Self {
        Self::new(DaylightConfig::default())
    }
}

impl System for DaylightSystem {
    fn name(&self) -> &str {
        "daylight"
    }

    fn run(&mut self, ctx: &SystemContext, garden: &mut Garden, _rng: &mut SystemRng<'_>) {
        if let Some(fade) = garden.fade.as_mut() {
            fade.remaining -= ctx.dt;
            if fade.remaining <= 0.0 {
                garden.fade = None;
            }
        }

        self.since_poll += ctx.dt;
        if self.since_poll < self.config.poll_interval_secs {
            return;
        }
        self.since_poll = 0.0;

        let windows = DaypartWindows::new(
            garden.weather.sunrise_seconds,
            garden.weather.sunset_seconds,
            &self.config,
        );
        let now = windows.classify(ctx.seconds_of_day);
        if now == garden.time_of_day {
            return;
        }
        let from = garden.time_of_day;
        info!(?from, to = ?now, "time of day changed");
        garden.time_of_day = now;
        garden.fade = Some(DaypartFade {
            from,
            to: now,
            remaining: self.config.fade_secs,
            duration: self.config.fade_secs,
        });
        garden
            .events
            .push(SimEvent::TimeOfDayChanged { from, to: now });
    }
}
