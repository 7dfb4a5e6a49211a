use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::{CareConfig, ExperienceConfig, SessionConfig},
    garden::{clamp_vital, Garden, LAMP_LEVEL_MAX},
    journal::JournalEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempDirection {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Water,
    ToggleWindow,
    ToggleLamp,
    LampUp,
    LampDown,
    /// Out-of-range levels are clamped into `0..=2`.
    SetLampLevel(i32),
    KillPest,
    RemoveMold,
    AdjustTemperature(TempDirection),
    Fertilize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// False when the action had nothing to act on.
    pub applied: bool,
    pub exp_gained: f64,
    pub level_ups: u32,
    #[serde(skip)]
    pub journal: Vec<JournalEvent>,
}

impl ActionOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn applied() -> Self {
        Self {
            applied: true,
            ..Self::default()
        }
    }
}

/// Applies player actions to a garden and grants experience for them.
pub struct ActionDispatcher {
    care: CareConfig,
    experience: ExperienceConfig,
    event_multiplier: f64,
}

impl ActionDispatcher {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            care: config.care.clone(),
            experience: config.experience.clone(),
            event_multiplier: config.weather_events.exp_multiplier,
        }
    }

    /// 1.5x (by default) while an active weather event matches the real
    /// weather, otherwise 1.0.
    pub fn exp_multiplier(&self, garden: &Garden) -> f64 {
        if garden.event_matches_weather() {
            self.event_multiplier
        } else {
            1.0
        }
    }

    fn grant(&self, garden: &mut Garden, outcome: &mut ActionOutcome, base: f64) {
        let multiplier = self.exp_multiplier(garden);
        let gained = base * multiplier;
        outcome.exp_gained = if gained.is_finite() { gained.max(0.0) } else { 0.0 };
        outcome.level_ups = garden.progression.add_exp(base, multiplier);
    }

    pub fn apply(&self, garden: &mut Garden, action: PlayerAction) -> ActionOutcome {
        let mut outcome = match action {
            PlayerAction::Water => {
                garden.vitals.moisture = clamp_vital(garden.vitals.moisture + self.care.water_amount);
                let mut outcome = ActionOutcome::applied();
                outcome.journal.push(JournalEvent::Water {
                    amount: self.care.water_amount,
                });
                self.grant(garden, &mut outcome, self.experience.water);
                outcome
            }
            PlayerAction::ToggleWindow => {
                garden.flags.window_open = !garden.flags.window_open;
                let mut outcome = ActionOutcome::applied();
                outcome.journal.push(JournalEvent::Window {
                    open: garden.flags.window_open,
                });
                outcome
            }
            PlayerAction::ToggleLamp => {
                garden.flags.lamp_on = !garden.flags.lamp_on;
                garden.sync_light();
                ActionOutcome::applied()
            }
            PlayerAction::LampUp => {
                let level = garden.flags.lamp_level as i32 + 1;
                self.set_lamp_level(garden, level)
            }
            PlayerAction::LampDown => {
                let level = garden.flags.lamp_level as i32 - 1;
                self.set_lamp_level(garden, level)
            }
            PlayerAction::SetLampLevel(level) => self.set_lamp_level(garden, level),
            PlayerAction::KillPest => {
                if !garden.incidents.has_pest {
                    return ActionOutcome::ignored();
                }
                garden.incidents.has_pest = false;
                garden.vitals.happiness =
                    clamp_vital(garden.vitals.happiness + self.care.resolve_happiness_bonus);
                debug!("pests removed");
                let mut outcome = ActionOutcome::applied();
                self.grant(garden, &mut outcome, self.experience.kill_pest);
                outcome
            }
            PlayerAction::RemoveMold => {
                if !garden.incidents.has_mold {
                    return ActionOutcome::ignored();
                }
                garden.incidents.has_mold = false;
                garden.vitals.happiness =
                    clamp_vital(garden.vitals.happiness + self.care.resolve_happiness_bonus);
                debug!("mold removed");
                let mut outcome = ActionOutcome::applied();
                self.grant(garden, &mut outcome, self.experience.remove_mold);
                outcome
            }
            PlayerAction::AdjustTemperature(direction) => {
                let delta = match direction {
                    TempDirection::Down => -1,
                    TempDirection::Up => 1,
                };
                garden.set_room_temperature(garden.room_temperature.saturating_add(delta));
                let mut outcome = ActionOutcome::applied();
                self.grant(garden, &mut outcome, self.experience.temperature);
                outcome
            }
            PlayerAction::Fertilize => {
                garden.vitals.nutrition =
                    clamp_vital(garden.vitals.nutrition + self.care.fertilize_amount);
                let mut outcome = ActionOutcome::applied();
                self.grant(garden, &mut outcome, self.experience.fertilize);
                outcome
            }
        };
        garden.refresh_diagnostics();
        if outcome.level_ups > 0 {
            outcome.journal.push(JournalEvent::Stage {
                value: format!("level {}", garden.progression.level()),
            });
        }
        outcome
    }

    fn set_lamp_level(&self, garden: &mut Garden, level: i32) -> ActionOutcome {
        if !garden.flags.lamp_on {
            return ActionOutcome::ignored();
        }
        garden.flags.lamp_level = level.clamp(0, LAMP_LEVEL_MAX as i32) as u8;
        garden.sync_light();
        ActionOutcome::applied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        plant::PlantCatalogue,
        weather::{TimeOfDay, WeatherSnapshot, WeatherTag},
    };

    fn setup() -> (Garden, ActionDispatcher) {
        let config = SessionConfig::default();
        let catalogue =
            PlantCatalogue::from_json(r#"[{"id": "ivy", "min_temp": 15, "max_temp": 25}]"#)
                .unwrap();
        let garden = Garden::new(
            catalogue.get(0).unwrap(),
            &config,
            WeatherSnapshot::new(WeatherTag::Rain),
            TimeOfDay::Day,
        );
        (garden, ActionDispatcher::new(&config))
    }

    #[test]
    fn water_clamps_and_journals() {
        let (mut garden, dispatcher) = setup();
        garden.vitals.moisture = 95.0;
        let outcome = dispatcher.apply(&mut garden, PlayerAction::Water);
        assert_eq!(garden.vitals.moisture, 100.0);
        assert_eq!(outcome.exp_gained, 1.0);
        assert_eq!(outcome.journal, vec![JournalEvent::Water { amount: 10.0 }]);
    }

    #[test]
    fn resolving_absent_hazard_changes_nothing() {
        let (mut garden, dispatcher) = setup();
        let vitals = garden.vitals;
        let progression = garden.progression;
        for action in [PlayerAction::KillPest, PlayerAction::RemoveMold] {
            let outcome = dispatcher.apply(&mut garden, action);
            assert!(!outcome.applied);
            assert_eq!(outcome.exp_gained, 0.0);
        }
        assert_eq!(garden.vitals, vitals);
        assert_eq!(garden.progression, progression);
    }

    #[test]
    fn kill_pest_clears_flag_and_rewards() {
        let (mut garden, dispatcher) = setup();
        garden.incidents.has_pest = true;
        garden.vitals.happiness = 50.0;
        let outcome = dispatcher.apply(&mut garden, PlayerAction::KillPest);
        assert!(outcome.applied);
        assert!(!garden.incidents.has_pest);
        assert_eq!(garden.vitals.happiness, 60.0);
        assert_eq!(garden.progression.exp(), 10.0);
    }

    #[test]
    fn matching_event_boosts_experience() {
        let (mut garden, dispatcher) = setup();
        let mut effective = garden.effective_tag;
        garden
            .weather_event
            .trigger(WeatherTag::Rain, 60.0, &mut effective);
        garden.effective_tag = effective;
        let outcome = dispatcher.apply(&mut garden, PlayerAction::Fertilize);
        assert!((outcome.exp_gained - 7.5).abs() < 1e-9);

        let (mut other, dispatcher) = setup();
        let mut effective = other.effective_tag;
        other
            .weather_event
            .trigger(WeatherTag::Snow, 60.0, &mut effective);
        other.effective_tag = effective;
        let outcome = dispatcher.apply(&mut other, PlayerAction::Fertilize);
        assert_eq!(outcome.exp_gained, 5.0);
    }

    #[test]
    fn lamp_level_needs_lamp_on_and_clamps() {
        let (mut garden, dispatcher) = setup();
        assert!(!dispatcher.apply(&mut garden, PlayerAction::LampUp).applied);
        dispatcher.apply(&mut garden, PlayerAction::ToggleLamp);
        dispatcher.apply(&mut garden, PlayerAction::SetLampLevel(7));
        assert_eq!(garden.flags.lamp_level, 2);
        assert_eq!(garden.vitals.light, 100.0);
        dispatcher.apply(&mut garden, PlayerAction::SetLampLevel(-3));
        assert_eq!(garden.flags.lamp_level, 0);
        dispatcher.apply(&mut garden, PlayerAction::LampDown);
        assert_eq!(garden.flags.lamp_level, 0);
        dispatcher.apply(&mut garden, PlayerAction::LampUp);
        assert_eq!(garden.flags.lamp_level, 1);
    }

    #[test]
    fn temperature_steps_and_level_up_journals_stage() {
        let (mut garden, dispatcher) = setup();
        dispatcher.apply(&mut garden, PlayerAction::AdjustTemperature(TempDirection::Down));
        assert_eq!(garden.room_temperature, 21);
        assert_eq!(garden.vitals.temperature, 21.0);

        let mut stages = Vec::new();
        for _ in 0..40 {
            let outcome =
                dispatcher.apply(&mut garden, PlayerAction::AdjustTemperature(TempDirection::Up));
            stages.extend(outcome.journal);
        }
        assert_eq!(garden.progression.level(), 2);
        assert_eq!(
            stages,
            vec![JournalEvent::Stage {
                value: "level 2".into()
            }]
        );
    }

    #[test]
    fn multi_level_grant_journals_reached_level_once() {
        let (mut garden, dispatcher) = setup();
        garden.progression.add_exp(95.0, 1.0);
        let outcome = dispatcher.apply(&mut garden, PlayerAction::Fertilize);
        assert_eq!(outcome.level_ups, 1);

        let mut config = SessionConfig::default();
        config.experience.water = 350.0;
        let generous = ActionDispatcher::new(&config);
        let outcome = generous.apply(&mut garden, PlayerAction::Water);
        assert_eq!(outcome.level_ups, 3);
        assert_eq!(
            outcome.journal,
            vec![
                JournalEvent::Water { amount: 10.0 },
                JournalEvent::Stage {
                    value: "level 5".into()
                }
            ]
        );
    }
}
