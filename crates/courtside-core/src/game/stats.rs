// Statistics aggregator.
//
// Everything here is derived from the stream of accepted score and foul
// events. Nothing is set directly by the operator.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoreboard::{leader_of, FoulType, Side};

/// Default capacity of the scoring history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
/// Default capacity of the sanction log.
pub const DEFAULT_SANCTIONS_CAPACITY: usize = 30;

// ---------------------------------------------------------------------------
// Bounded log
// ---------------------------------------------------------------------------

/// Fixed-capacity log ordered newest first. Pushing past capacity evicts
/// the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedLog<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> BoundedLog<T> {
    pub fn new(capacity: usize) -> Self {
        BoundedLog {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Prepend an entry, evicting from the back once over capacity.
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One accepted scoring event with the score it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub at: DateTime<Utc>,
    pub period: u32,
    pub side: Side,
    pub delta: i32,
    pub score_home: u32,
    pub score_away: u32,
    pub player_name: String,
    pub player_number: String,
}

/// One accepted foul.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoulEvent {
    pub at: DateTime<Utc>,
    pub period: u32,
    pub side: Side,
    pub foul_type: FoulType,
    pub player_name: String,
    pub player_number: String,
}

/// Points per side within one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTally {
    pub home: i64,
    pub away: i64,
}

impl PeriodTally {
    pub fn get(&self, side: Side) -> i64 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    fn add(&mut self, side: Side, points: i32) {
        match side {
            Side::Home => self.home += i64::from(points),
            Side::Away => self.away += i64::from(points),
        }
    }
}

/// Uninterrupted scoring streak by one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub side: Side,
    pub points: i64,
}

// ---------------------------------------------------------------------------
// Aggregated state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsState {
    pub history: BoundedLog<ScoreEvent>,
    pub sanctions: BoundedLog<FoulEvent>,
    pub lead_changes: u32,
    pub largest_lead: u32,
    pub largest_lead_side: Option<Side>,
    pub per_period: BTreeMap<u32, PeriodTally>,
    pub active_run: Option<Run>,
}

impl StatisticsState {
    pub fn new(history_capacity: usize, sanctions_capacity: usize) -> Self {
        StatisticsState {
            history: BoundedLog::new(history_capacity),
            sanctions: BoundedLog::new(sanctions_capacity),
            lead_changes: 0,
            largest_lead: 0,
            largest_lead_side: None,
            per_period: BTreeMap::new(),
            active_run: None,
        }
    }

    /// Fold one accepted scoring event into the statistics.
    ///
    /// `before` and `after` are `(home, away)` scores around this event.
    pub fn record_score(&mut self, event: ScoreEvent, before: (u32, u32)) {
        let after = (event.score_home, event.score_away);

        let leader_before = leader_of(before.0, before.1);
        let leader_after = leader_of(after.0, after.1);
        if let (Some(prev), Some(next)) = (leader_before, leader_after) {
            if prev != next {
                self.lead_changes += 1;
            }
        }

        let margin = after.0.abs_diff(after.1);
        if margin > self.largest_lead {
            self.largest_lead = margin;
            self.largest_lead_side = leader_after;
        }

        self.per_period
            .entry(event.period)
            .or_default()
            .add(event.side, event.delta);

        self.active_run = Some(match self.active_run {
            Some(run) if run.side == event.side => Run {
                side: run.side,
                points: run.points + i64::from(event.delta),
            },
            _ => Run {
                side: event.side,
                points: i64::from(event.delta),
            },
        });

        self.history.push(event);
    }

    /// Log one accepted foul.
    pub fn record_foul(&mut self, event: FoulEvent) {
        self.sanctions.push(event);
    }

    /// Points scored by `side` in `period`.
    pub fn period_points(&self, period: u32, side: Side) -> i64 {
        self.per_period
            .get(&period)
            .map(|tally| tally.get(side))
            .unwrap_or(0)
    }
}

impl Default for StatisticsState {
    fn default() -> Self {
        StatisticsState::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_SANCTIONS_CAPACITY)
    }
}
