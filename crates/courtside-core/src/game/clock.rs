// Game clock: drift-corrected countdown for a single period.
//
// Remaining time is charged from wall-clock deltas between ticks, never from
// tick counts, so irregular tick cadence does not skew the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shortest configurable period, in minutes.
pub const MIN_PERIOD_MINUTES: u32 = 1;
/// Longest configurable period, in minutes.
pub const MAX_PERIOD_MINUTES: u32 = 60;

const MS_PER_MINUTE: u64 = 60_000;

/// Countdown clock state.
///
/// `anchor` is present exactly when `running` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    /// Whether the countdown is currently running.
    pub running: bool,
    /// Length of the current period in milliseconds.
    pub base_ms: u64,
    /// Milliseconds left in the current period.
    pub remaining_ms: u64,
    /// Wall-clock instant the remaining time was last reconciled against.
    pub anchor: Option<DateTime<Utc>>,
}

impl GameClock {
    /// A stopped clock rewound to a full period of `minutes` (clamped).
    pub fn new(minutes: u32) -> Self {
        let ms = minutes_to_ms(clamp_minutes(minutes));
        GameClock {
            running: false,
            base_ms: ms,
            remaining_ms: ms,
            anchor: None,
        }
    }

    /// Start the countdown. No-op while already running.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.running {
            return;
        }
        self.running = true;
        self.anchor = Some(now);
    }

    /// Pause the countdown, charging time elapsed since the last tick.
    /// No-op while stopped.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !self.running {
            return;
        }
        self.tick(now);
        self.running = false;
        self.anchor = None;
    }

    /// Start when stopped, pause when running.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.running {
            self.pause(now);
        } else {
            self.start(now);
        }
    }

    /// Charge the time elapsed since the anchor and move the anchor to `now`.
    ///
    /// Returns `true` if this tick ran the clock down to zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let Some(anchor) = self.anchor.filter(|_| self.running) else {
            return false;
        };

        let elapsed = elapsed_ms(anchor, now);
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);

        if self.remaining_ms == 0 {
            debug!("clock expired");
            self.running = false;
            self.anchor = None;
            return true;
        }

        self.anchor = Some(now);
        false
    }

    /// Remaining time as of `now` without mutating the clock.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match self.anchor {
            Some(anchor) if self.running => {
                self.remaining_ms.saturating_sub(elapsed_ms(anchor, now))
            }
            _ => self.remaining_ms,
        }
    }

    /// Set a new period length. Clamps to [1, 60] minutes, stops and rewinds.
    ///
    /// Returns the minutes actually applied.
    pub fn set_duration(&mut self, minutes: u32) -> u32 {
        let minutes = clamp_minutes(minutes);
        self.rewind(minutes_to_ms(minutes));
        minutes
    }

    /// Stop the clock and reset both base and remaining time to `ms`.
    pub fn rewind(&mut self, ms: u64) {
        self.base_ms = ms;
        self.remaining_ms = ms;
        self.running = false;
        self.anchor = None;
    }

    /// Whether the period's time has fully run out.
    pub fn is_expired(&self) -> bool {
        self.remaining_ms == 0
    }
}

/// Clamp a period length to the supported minute range.
pub fn clamp_minutes(minutes: u32) -> u32 {
    minutes.clamp(MIN_PERIOD_MINUTES, MAX_PERIOD_MINUTES)
}

/// Convert whole minutes to milliseconds.
pub fn minutes_to_ms(minutes: u32) -> u64 {
    u64::from(minutes) * MS_PER_MINUTE
}

/// Render remaining milliseconds as `MM:SS`.
///
/// Rounds up to the next whole second so the display never reads `00:00`
/// while time remains.
pub fn format_clock(ms: u64) -> String {
    let total_secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Milliseconds from `from` to `to`; a clock stepping backwards counts as 0.
fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}
