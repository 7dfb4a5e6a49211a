use serde::{Deserialize, Serialize};

/// Level and experience of the current session. `exp` stays below the
/// per-level threshold; overflow rolls into level-ups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    exp: f64,
    exp_per_level: f64,
}

impl Default for Progression {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Progression {
    pub fn new(exp_per_level: f64) -> Self {
        Self {
            level: 1,
            exp: 0.0,
            exp_per_level: if exp_per_level.is_finite() && exp_per_level > 0.0 {
                exp_per_level
            } else {
                100.0
            },
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn exp(&self) -> f64 {
        self.exp
    }

    /// Fraction of the way to the next level, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        self.exp / self.exp_per_level
    }

    /// Adds `base * multiplier` and returns the number of levels gained.
    /// Negative or non-finite grants add nothing.
    pub fn add_exp(&mut self, base: f64, multiplier: f64) -> u32 {
        let gained = base * multiplier;
        if !gained.is_finite() || gained <= 0.0 {
            return 0;
        }
        self.exp += gained;
        if self.exp < self.exp_per_level {
            return 0;
        }
        let whole = (self.exp / self.exp_per_level).floor();
        self.exp = self.exp.rem_euclid(self.exp_per_level);
        if !self.exp.is_finite() || self.exp >= self.exp_per_level {
            self.exp = 0.0;
        }
        // Float-to-int `as` saturates.
        let levels = whole as u32;
        self.level = self.level.saturating_add(levels);
        levels
    }
}
