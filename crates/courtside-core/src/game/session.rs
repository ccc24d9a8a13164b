// Match session: the single owner of live match state.
//
// Every change to the scoreboard, clock or statistics goes through
// `MatchSession::apply`. Score and foul submissions are validated against
// the assigned roster before anything is mutated, then deduplicated, then
// applied to the scoreboard and statistics from the same pre-event state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::clock::{clamp_minutes, format_clock, GameClock};
use super::dedup::{Deduplicator, Signature, DEFAULT_DEDUP_WINDOW_MS};
use super::scoreboard::{FoulType, ScoreboardState, Side, TeamSlot, DEFAULT_FOUL_LIMIT};
use super::stats::{
    FoulEvent, ScoreEvent, StatisticsState, DEFAULT_HISTORY_CAPACITY,
    DEFAULT_SANCTIONS_CAPACITY,
};
use crate::roster::{Player, PlayerId, RosterStore, TeamId};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Match rules and limits, usually built from the loaded config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub period_length_minutes: u32,
    pub periods_total: u32,
    pub anti_duplicate: bool,
    pub dedup_window_ms: u64,
    pub foul_limit: u32,
    pub history_capacity: usize,
    pub sanctions_capacity: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        MatchSettings {
            period_length_minutes: 10,
            periods_total: 4,
            anti_duplicate: false,
            dedup_window_ms: DEFAULT_DEDUP_WINDOW_MS,
            foul_limit: DEFAULT_FOUL_LIMIT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            sanctions_capacity: DEFAULT_SANCTIONS_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Actions and results
// ---------------------------------------------------------------------------

/// Everything the operator (or the tick timer) can do to a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Score {
        side: Side,
        points: i32,
        player: PlayerId,
    },
    Foul {
        side: Side,
        foul_type: FoulType,
        player: PlayerId,
    },
    StartClock,
    PauseClock,
    ToggleClock,
    Tick,
    SetDuration(u32),
    AdvancePeriod,
    ResetFouls,
    SetAntiDuplicate(bool),
    AssignTeams {
        home: Option<TeamId>,
        away: Option<TeamId>,
    },
    Reset,
}

/// What an accepted action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed (or the action was a harmless no-op such as pausing a
    /// stopped clock).
    Applied,
    /// Dropped as a duplicate of the previous action. Nothing changed.
    Suppressed,
    /// A tick ran the clock down to zero.
    ClockExpired,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("player required for side {side}")]
    PlayerRequired { side: Side },

    #[error("unknown team {0}")]
    UnknownTeam(TeamId),
}

/// Read-only copy of the match for rendering and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub settings: MatchSettings,
    pub scoreboard: ScoreboardState,
    pub stats: StatisticsState,
    pub clock_display: String,
    pub home_in_bonus: bool,
    pub away_in_bonus: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MatchSession {
    pub settings: MatchSettings,
    pub scoreboard: ScoreboardState,
    pub stats: StatisticsState,
    dedup: Deduplicator,
}

impl MatchSession {
    pub fn new(settings: MatchSettings) -> Self {
        let mut settings = settings;
        settings.period_length_minutes = clamp_minutes(settings.period_length_minutes);
        MatchSession {
            scoreboard: ScoreboardState::new(settings.period_length_minutes, settings.foul_limit),
            stats: StatisticsState::new(settings.history_capacity, settings.sanctions_capacity),
            dedup: Deduplicator::new(settings.dedup_window_ms),
            settings,
        }
    }

    /// Apply one action. Either the whole transition happens or nothing does.
    pub fn apply<R>(
        &mut self,
        action: Action,
        roster: &R,
        now: DateTime<Utc>,
    ) -> Result<Outcome, ActionError>
    where
        R: RosterStore + ?Sized,
    {
        match action {
            Action::Score {
                side,
                points,
                player,
            } => self.submit_score(side, points, player, roster, now),
            Action::Foul {
                side,
                foul_type,
                player,
            } => self.submit_foul(side, foul_type, player, roster, now),
            Action::StartClock => {
                self.scoreboard.clock.start(now);
                Ok(Outcome::Applied)
            }
            Action::PauseClock => {
                self.scoreboard.clock.pause(now);
                Ok(Outcome::Applied)
            }
            Action::ToggleClock => {
                self.scoreboard.clock.toggle(now);
                Ok(Outcome::Applied)
            }
            Action::Tick => Ok(self.tick(now)),
            Action::SetDuration(minutes) => {
                let applied = self.scoreboard.clock.set_duration(minutes);
                self.settings.period_length_minutes = applied;
                info!(minutes = applied, "period length set");
                Ok(Outcome::Applied)
            }
            Action::AdvancePeriod => {
                self.scoreboard
                    .advance_period(self.settings.periods_total, self.settings.period_length_minutes);
                Ok(Outcome::Applied)
            }
            Action::ResetFouls => {
                self.scoreboard.reset_period_fouls();
                Ok(Outcome::Applied)
            }
            Action::SetAntiDuplicate(enabled) => {
                self.settings.anti_duplicate = enabled;
                info!(enabled, "anti-duplicate toggled");
                Ok(Outcome::Applied)
            }
            Action::AssignTeams { home, away } => {
                self.assign_teams(home, away, roster)?;
                Ok(Outcome::Applied)
            }
            Action::Reset => {
                self.reset();
                Ok(Outcome::Applied)
            }
        }
    }

    /// Award points to `side`, credited to `player` of that side's roster.
    pub fn submit_score<R>(
        &mut self,
        side: Side,
        points: i32,
        player: PlayerId,
        roster: &R,
        now: DateTime<Utc>,
    ) -> Result<Outcome, ActionError>
    where
        R: RosterStore + ?Sized,
    {
        let player = self.resolve_player(side, player, roster)?;

        let signature = Signature::Score {
            side,
            points,
            period: self.scoreboard.period,
        };
        if !self
            .dedup
            .should_accept(signature, self.settings.anti_duplicate, now)
        {
            debug!(%side, points, "duplicate score suppressed");
            return Ok(Outcome::Suppressed);
        }

        let before = self.scoreboard.scores();
        self.scoreboard.award_points(side, points);
        let (score_home, score_away) = self.scoreboard.scores();

        self.stats.record_score(
            ScoreEvent {
                at: now,
                period: self.scoreboard.period,
                side,
                delta: points,
                score_home,
                score_away,
                player_name: player.name,
                player_number: player.number,
            },
            before,
        );
        Ok(Outcome::Applied)
    }

    /// Record a foul by `player` of `side`.
    pub fn submit_foul<R>(
        &mut self,
        side: Side,
        foul_type: FoulType,
        player: PlayerId,
        roster: &R,
        now: DateTime<Utc>,
    ) -> Result<Outcome, ActionError>
    where
        R: RosterStore + ?Sized,
    {
        let player = self.resolve_player(side, player, roster)?;

        let signature = Signature::Foul {
            side,
            foul_type,
            period: self.scoreboard.period,
        };
        if !self
            .dedup
            .should_accept(signature, self.settings.anti_duplicate, now)
        {
            debug!(%side, %foul_type, "duplicate foul suppressed");
            return Ok(Outcome::Suppressed);
        }

        self.scoreboard.record_foul(side, foul_type);
        self.stats.record_foul(FoulEvent {
            at: now,
            period: self.scoreboard.period,
            side,
            foul_type,
            player_name: player.name,
            player_number: player.number,
        });
        Ok(Outcome::Applied)
    }

    /// Charge elapsed wall-clock time to the running clock.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Outcome {
        if self.scoreboard.clock.tick(now) {
            info!(period = self.scoreboard.period, "period clock expired");
            Outcome::ClockExpired
        } else {
            Outcome::Applied
        }
    }

    /// Put teams on the two sides and start the match over.
    ///
    /// Both ids are checked before anything changes. `None` leaves that side
    /// as an unassigned placeholder.
    pub fn assign_teams<R>(
        &mut self,
        home: Option<TeamId>,
        away: Option<TeamId>,
        roster: &R,
    ) -> Result<(), ActionError>
    where
        R: RosterStore + ?Sized,
    {
        let lookup = |id: Option<TeamId>| match id {
            Some(id) => roster.team(id).map(Some).ok_or(ActionError::UnknownTeam(id)),
            None => Ok(None),
        };
        let home_team = lookup(home)?;
        let away_team = lookup(away)?;

        self.reset();
        self.scoreboard.home = TeamSlot::for_team(Side::Home, home_team.as_ref());
        self.scoreboard.away = TeamSlot::for_team(Side::Away, away_team.as_ref());
        info!(
            home = %self.scoreboard.home.name,
            away = %self.scoreboard.away.name,
            "teams assigned"
        );
        Ok(())
    }

    /// Back to period 1 with a full clock, zero scores and fresh statistics.
    /// Team assignments and settings are kept.
    pub fn reset(&mut self) {
        let home = reset_slot(&self.scoreboard.home);
        let away = reset_slot(&self.scoreboard.away);
        self.scoreboard =
            ScoreboardState::new(self.settings.period_length_minutes, self.settings.foul_limit);
        self.scoreboard.home = home;
        self.scoreboard.away = away;
        self.stats = StatisticsState::new(
            self.settings.history_capacity,
            self.settings.sanctions_capacity,
        );
        self.dedup.clear();
        debug!("match state reset");
    }

    /// Players of the team assigned to `side`; empty when unassigned.
    pub fn roster<R>(&self, side: Side, store: &R) -> Vec<Player>
    where
        R: RosterStore + ?Sized,
    {
        self.scoreboard
            .slot(side)
            .team_id
            .and_then(|id| store.team(id))
            .map(|team| team.players)
            .unwrap_or_default()
    }

    pub fn clock(&self) -> &GameClock {
        &self.scoreboard.clock
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            settings: self.settings.clone(),
            scoreboard: self.scoreboard.clone(),
            stats: self.stats.clone(),
            clock_display: format_clock(self.scoreboard.clock.remaining_ms),
            home_in_bonus: self.scoreboard.in_bonus(Side::Home),
            away_in_bonus: self.scoreboard.in_bonus(Side::Away),
        }
    }

    fn resolve_player<R>(
        &self,
        side: Side,
        player: PlayerId,
        roster: &R,
    ) -> Result<Player, ActionError>
    where
        R: RosterStore + ?Sized,
    {
        self.scoreboard
            .slot(side)
            .team_id
            .and_then(|id| roster.team(id))
            .and_then(|team| team.player(player).cloned())
            .ok_or(ActionError::PlayerRequired { side })
    }
}

impl Default for MatchSession {
    fn default() -> Self {
        MatchSession::new(MatchSettings::default())
    }
}

fn reset_slot(slot: &TeamSlot) -> TeamSlot {
    TeamSlot {
        score: 0,
        fouls: 0,
        ..slot.clone()
    }
}
