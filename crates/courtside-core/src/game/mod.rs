// Live match engine: clock, scoreboard, duplicate suppression, statistics,
// and the session that coordinates them.

pub mod clock;
pub mod dedup;
pub mod scoreboard;
pub mod session;
pub mod stats;

pub use clock::{format_clock, GameClock};
pub use dedup::{Deduplicator, Signature};
pub use scoreboard::{FoulType, ScoreboardState, Side, TeamSlot};
pub use session::{Action, ActionError, MatchSession, MatchSettings, MatchSnapshot, Outcome};
pub use stats::{BoundedLog, FoulEvent, PeriodTally, Run, ScoreEvent, StatisticsState};
