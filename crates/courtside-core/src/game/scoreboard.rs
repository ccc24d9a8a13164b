// Scoreboard state: period, clock, and the two sides' scores and fouls.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::clock::{minutes_to_ms, GameClock};
use crate::roster::{Team, TeamId};

/// Personal fouls at which a side enters the bonus.
pub const DEFAULT_FOUL_LIMIT: u32 = 5;

/// Headroom kept above the bonus threshold for the foul counter display.
pub const FOUL_CEILING_HEADROOM: u32 = 5;

/// One of the two competing sides, referenced positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Side A.
    Home,
    /// Side B.
    Away,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    /// Single-letter code used in logs and exports ("A" / "B").
    pub fn code(self) -> &'static str {
        match self {
            Side::Home => "A",
            Side::Away => "B",
        }
    }

    /// Display label ("HOME" / "AWAY").
    pub fn label(self) -> &'static str {
        match self {
            Side::Home => "HOME",
            Side::Away => "AWAY",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Kind of foul being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoulType {
    Personal,
    Technical,
    Unsportsmanlike,
}

impl FoulType {
    /// Only personal fouls count toward the bonus.
    pub fn counts_toward_bonus(self) -> bool {
        matches!(self, FoulType::Personal)
    }

    pub fn label(self) -> &'static str {
        match self {
            FoulType::Personal => "Personal",
            FoulType::Technical => "Technical",
            FoulType::Unsportsmanlike => "Unsportsmanlike",
        }
    }
}

impl fmt::Display for FoulType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A side's slot on the scoreboard.
///
/// Holds a copy of the assigned team's identity so roster edits during the
/// match never rewrite what the scoreboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSlot {
    pub team_id: Option<TeamId>,
    pub name: String,
    pub logo: Option<String>,
    pub score: u32,
    pub fouls: u32,
}

impl TeamSlot {
    /// An unassigned slot showing the side's placeholder name.
    pub fn placeholder(side: Side) -> Self {
        let name = match side {
            Side::Home => "HOME",
            Side::Away => "AWAY",
        };
        TeamSlot {
            team_id: None,
            name: name.to_string(),
            logo: None,
            score: 0,
            fouls: 0,
        }
    }

    /// A fresh slot for `team`, or the placeholder when no team is given.
    pub fn for_team(side: Side, team: Option<&Team>) -> Self {
        match team {
            Some(team) => TeamSlot {
                team_id: Some(team.id),
                name: team.name.clone(),
                logo: team.logo.clone(),
                score: 0,
                fouls: 0,
            },
            None => TeamSlot::placeholder(side),
        }
    }
}

/// The authoritative scoreboard record for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardState {
    /// Current period, 1-based.
    pub period: u32,
    pub clock: GameClock,
    pub home: TeamSlot,
    pub away: TeamSlot,
    /// Personal fouls at which a side is in the bonus.
    pub foul_limit: u32,
}

impl ScoreboardState {
    /// Start-of-match scoreboard with a stopped clock of `period_minutes`.
    pub fn new(period_minutes: u32, foul_limit: u32) -> Self {
        ScoreboardState {
            period: 1,
            clock: GameClock::new(period_minutes),
            home: TeamSlot::placeholder(Side::Home),
            away: TeamSlot::placeholder(Side::Away),
            foul_limit,
        }
    }

    pub fn slot(&self, side: Side) -> &TeamSlot {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut TeamSlot {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// Scores as `(home, away)`.
    pub fn scores(&self) -> (u32, u32) {
        (self.home.score, self.away.score)
    }

    /// Add `points` to a side's score, flooring at zero.
    pub fn award_points(&mut self, side: Side, points: i32) {
        let slot = self.slot_mut(side);
        let next = i64::from(slot.score) + i64::from(points);
        slot.score = u32::try_from(next.max(0)).unwrap_or(u32::MAX);
    }

    /// Record a foul against a side. Only personal fouls move the counter,
    /// which never exceeds the ceiling.
    pub fn record_foul(&mut self, side: Side, foul_type: FoulType) {
        if !foul_type.counts_toward_bonus() {
            return;
        }
        let ceiling = self.foul_ceiling();
        let slot = self.slot_mut(side);
        slot.fouls = (slot.fouls + 1).min(ceiling);
    }

    /// Clear both sides' foul counters.
    pub fn reset_period_fouls(&mut self) {
        self.home.fouls = 0;
        self.away.fouls = 0;
    }

    /// Move to the next period (saturating at `periods_total`), rewind the
    /// clock to a full `period_minutes`, and clear fouls.
    pub fn advance_period(&mut self, periods_total: u32, period_minutes: u32) {
        self.period = (self.period + 1).min(periods_total.max(1));
        self.clock.rewind(minutes_to_ms(period_minutes));
        self.reset_period_fouls();
        info!(period = self.period, "advanced to period");
    }

    /// Whether `side` has reached the bonus threshold this period.
    pub fn in_bonus(&self, side: Side) -> bool {
        self.slot(side).fouls >= self.foul_limit
    }

    /// Largest value the foul counter can show.
    pub fn foul_ceiling(&self) -> u32 {
        self.foul_limit + FOUL_CEILING_HEADROOM
    }

    /// The side currently ahead, or `None` when tied.
    pub fn leader(&self) -> Option<Side> {
        leader_of(self.home.score, self.away.score)
    }
}

/// Leader for a `(home, away)` score pair; `None` when tied.
pub fn leader_of(home: u32, away: u32) -> Option<Side> {
    match home.cmp(&away) {
        std::cmp::Ordering::Greater => Some(Side::Home),
        std::cmp::Ordering::Less => Some(Side::Away),
        std::cmp::Ordering::Equal => None,
    }
}
