// Message types exchanged between the app loop and the TUI.

use courtside_core::game::{FoulType, MatchSnapshot, Side};
use courtside_core::roster::{Player, PlayerId, Team, TeamId};

/// Commands sent from the TUI to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
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
    ToggleClock,
    NextPeriod,
    ResetFouls,
    /// Lengthen (positive) or shorten (negative) the period by whole minutes.
    AdjustPeriodLength(i32),
    ToggleAntiDuplicate,
    AssignTeams {
        home: Option<TeamId>,
        away: Option<TeamId>,
    },
    ResetMatch,
    Export,

    // Roster editing
    AddTeam {
        name: String,
        logo: Option<String>,
    },
    /// `None` clears the logo.
    SetTeamLogo {
        team: TeamId,
        logo: Option<String>,
    },
    DeleteTeam(TeamId),
    AddPlayer {
        team: TeamId,
        name: String,
        number: String,
    },
    DeletePlayer(PlayerId),

    Quit,
}

/// Updates pushed from the app loop to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    Notice(Notice),
}

/// Everything the TUI needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    pub game: MatchSnapshot,
    /// All teams in the roster store, for the team picker.
    pub teams: Vec<Team>,
    pub home_roster: Vec<Player>,
    pub away_roster: Vec<Player>,
}

impl AppSnapshot {
    pub fn roster(&self, side: Side) -> &[Player] {
        match side {
            Side::Home => &self.home_roster,
            Side::Away => &self.away_roster,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message shown in the status bar until replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
