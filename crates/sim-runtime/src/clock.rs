//! Simulation clock: speed levels, tick interval and the month timer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Real-time multipliers for speed levels 1 to 5.
const MULTIPLIERS: [f64; 5] = [0.5, 0.75, 1.0, 2.0, 4.0];
/// Floor on the tick interval, whatever the speed.
const MIN_INTERVAL_MS: u64 = 50;

/// One of five discrete simulation speeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    pub const SLOWEST: SpeedLevel = SpeedLevel(1);
    /// Real time, one game day per second.
    pub const NORMAL: SpeedLevel = SpeedLevel(3);
    pub const FASTEST: SpeedLevel = SpeedLevel(5);

    pub fn new(level: u8) -> Option<Self> {
        (1..=5).contains(&level).then_some(SpeedLevel(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn multiplier(self) -> f64 {
        MULTIPLIERS[usize::from(self.0 - 1)]
    }

    /// Real time between two ticks: `max(50ms, floor(1000ms / multiplier))`.
    pub fn tick_interval(self) -> Duration {
        let ms = (1000.0 / self.multiplier()).floor() as u64;
        Duration::from_millis(ms.max(MIN_INTERVAL_MS))
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        SpeedLevel::NORMAL
    }
}

impl TryFrom<u8> for SpeedLevel {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        SpeedLevel::new(v).ok_or_else(|| format!("speed level {v} is out of range [1, 5]"))
    }
}

impl From<SpeedLevel> for u8 {
    fn from(s: SpeedLevel) -> u8 {
        s.0
    }
}

/// Running/paused state plus the real-time accumulators.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimClock {
    paused: bool,
    speed: SpeedLevel,
    /// Real seconds since the last monthly pass.
    month_timer: f64,
    /// Real time handed to [`SimClock::advance`] that did not yet make a full tick.
    pending: Duration,
}

impl SimClock {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn speed(&self) -> SpeedLevel {
        self.speed
    }

    pub fn set_speed(&mut self, speed: SpeedLevel) {
        self.speed = speed;
    }

    pub fn tick_interval(&self) -> Duration {
        self.speed.tick_interval()
    }

    pub fn month_timer(&self) -> f64 {
        self.month_timer
    }

    /// Account one tick on the month timer. Returns true when a month is due,
    /// in which case the timer restarts from zero.
    pub fn on_tick(&mut self, month_duration_secs: f64) -> bool {
        self.month_timer += self.tick_interval().as_secs_f64();
        if self.month_timer >= month_duration_secs {
            self.month_timer = 0.0;
            true
        } else {
            false
        }
    }

    /// Feed elapsed real time and return how many ticks are due. Time that
    /// passes while paused is dropped.
    pub fn advance(&mut self, real: Duration) -> u32 {
        if self.paused {
            return 0;
        }
        self.pending += real;
        let interval = self.tick_interval();
        let due = self.pending.as_nanos() / interval.as_nanos();
        let due = u32::try_from(due).unwrap_or(u32::MAX);
        self.pending -= interval * due;
        due
    }
}
