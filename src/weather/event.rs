use serde::{Deserialize, Serialize};

use super::WeatherTag;

/// A temporary override of the effective weather tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveWeatherEvent {
    pub tag: WeatherTag,
    /// Effective tag at the moment the event started; restored on expiry.
    pub saved_tag: WeatherTag,
    pub remaining: f64,
}

/// At most one weather event exists at a time: the state is either idle
/// (optionally cooling down) or carries exactly one active event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeatherEventState {
    Idle { cooldown: f64 },
    Active(ActiveWeatherEvent),
}

impl Default for WeatherEventState {
    fn default() -> Self {
        Self::Idle { cooldown: 0.0 }
    }
}

impl WeatherEventState {
    pub fn idle(cooldown: f64) -> Self {
        Self::Idle {
            cooldown: cooldown.max(0.0),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveWeatherEvent> {
        match self {
            Self::Active(event) => Some(event),
            Self::Idle { .. } => None,
        }
    }

    /// Idle with the cooldown fully elapsed.
    pub fn can_roll(&self) -> bool {
        matches!(self, Self::Idle { cooldown } if *cooldown <= 0.0)
    }

    /// Starts an event, overwriting `effective` with `tag`. Ignored while an
    /// event is already active; returns whether the event started.
    pub fn trigger(&mut self, tag: WeatherTag, duration: f64, effective: &mut WeatherTag) -> bool {
        if self.is_active() {
            return false;
        }
        *self = Self::Active(ActiveWeatherEvent {
            tag,
            saved_tag: *effective,
            remaining: duration.max(0.0),
        });
        *effective = tag;
        true
    }

    /// Advances timers by `dt`. On expiry the saved tag is written back into
    /// `effective`, the state returns to idle with `cooldown`, and the ended
    /// event is returned.
    pub fn advance(
        &mut self,
        dt: f64,
        effective: &mut WeatherTag,
        cooldown: f64,
    ) -> Option<ActiveWeatherEvent> {
        match self {
            Self::Idle { cooldown: remaining } => {
                *remaining = (*remaining - dt).max(0.0);
                None
            }
            Self::Active(event) => {
                event.remaining -= dt;
                if event.remaining > 0.0 {
                    return None;
                }
                let ended = *event;
                *effective = ended.saved_tag;
                *self = Self::idle(cooldown);
                Some(ended)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_then_expire_restores_saved_tag() {
        let mut effective = WeatherTag::Cloudy;
        let mut state = WeatherEventState::default();
        assert!(state.trigger(WeatherTag::Snow, 30.0, &mut effective));
        assert_eq!(effective, WeatherTag::Snow);

        assert!(state.advance(29.0, &mut effective, 20.0).is_none());
        assert_eq!(effective, WeatherTag::Snow);

        let ended = state.advance(1.0, &mut effective, 20.0).unwrap();
        assert_eq!(ended.tag, WeatherTag::Snow);
        assert_eq!(effective, WeatherTag::Cloudy);
        assert!(!state.is_active());
        assert_eq!(state, WeatherEventState::Idle { cooldown: 20.0 });
    }

    #[test]
    fn second_trigger_is_ignored() {
        let mut effective = WeatherTag::Clear;
        let mut state = WeatherEventState::default();
        state.trigger(WeatherTag::Rain, 40.0, &mut effective);
        let before = state;
        assert!(!state.trigger(WeatherTag::Snow, 5.0, &mut effective));
        assert_eq!(state, before);
        assert_eq!(effective, WeatherTag::Rain);
    }

    #[test]
    fn cooldown_counts_down_only_while_idle() {
        let mut effective = WeatherTag::Clear;
        let mut state = WeatherEventState::idle(20.0);
        assert!(!state.can_roll());
        state.advance(15.0, &mut effective, 20.0);
        assert!(!state.can_roll());
        state.advance(5.0, &mut effective, 20.0);
        assert!(state.can_roll());
    }
}
