//! Day/night clock: owns the day counter and the fraction of the day elapsed.

use crate::{subsystem::WorldClock, types::Day};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAY_LENGTH_SECS: f64 = 1200.0; // 20 real minutes

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayNightClock {
    pub current_day:     Day,
    /// Fraction of the current day elapsed, always in [0, 1).
    pub normalized_time: f64,
    pub day_length_secs: f64,
    pub paused:          bool,
}

impl DayNightClock {
    pub fn new(day_length_secs: f64) -> Self {
        Self {
            current_day: 0,
            normalized_time: 0.0,
            day_length_secs: if day_length_secs > 0.0 { day_length_secs } else { DEFAULT_DAY_LENGTH_SECS },
            paused: false,
        }
    }

    /// Advance by `seconds` of real time. Rolls over into following days.
    /// Returns the number of day boundaries crossed.
    pub fn advance(&mut self, seconds: f64) -> u32 {
        if self.paused || !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        let total = self.normalized_time + seconds / self.day_length_secs;
        let days_crossed = total.floor() as u32;
        self.current_day = self.current_day.saturating_add(days_crossed);
        self.normalized_time = wrap_unit(total);
        days_crossed
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    /// Nighttime is the first and last quarter of the day.
    pub fn is_night(&self) -> bool {
        self.normalized_time < 0.25 || self.normalized_time >= 0.75
    }
}

impl Default for DayNightClock {
    fn default() -> Self { Self::new(DEFAULT_DAY_LENGTH_SECS) }
}

impl WorldClock for DayNightClock {
    fn now(&self) -> (f64, Day) {
        (self.normalized_time, self.current_day)
    }

    fn set(&mut self, day: Day, normalized_time: f64) {
        self.current_day = day;
        self.normalized_time = wrap_unit(normalized_time);
    }
}

/// Map any real into [0, 1). Non-finite input maps to 0.
fn wrap_unit(t: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    let wrapped = t.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
