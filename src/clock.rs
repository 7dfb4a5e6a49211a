use chrono::{Local, Timelike};

/// Source of the local wall-clock time used for the day-part.
pub trait Clock: Send {
    fn seconds_of_day(&self) -> u32;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn seconds_of_day(&self) -> u32 {
        Local::now().num_seconds_from_midnight()
    }
}

/// Always reports the same time. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn seconds_of_day(&self) -> u32 {
        self.0
    }
}
