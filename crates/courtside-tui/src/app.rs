// Application state and orchestration logic.
//
// The app loop owns the match session and the roster database. User
// commands from the TUI and clock ticks arrive on one `tokio::select!` loop
// and are applied one at a time; the TUI only ever sees cloned snapshots.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{info, warn};

use courtside_core::config::Config;
use courtside_core::db::Database;
use courtside_core::export;
use courtside_core::game::{Action, ActionError, MatchSession, Outcome, Side};
use courtside_core::roster::{RosterStore, Team};

use crate::protocol::{AppSnapshot, Notice, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub session: MatchSession,
    pub db: Database,
    /// Stored teams with their players. Reloaded after every roster edit so
    /// snapshots never query the database.
    teams: Vec<Team>,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let session = MatchSession::new(config.match_settings());
        let teams = db.teams();
        AppState {
            config,
            session,
            db,
            teams,
        }
    }

    /// Apply one user command at `now`.
    ///
    /// Returns a notice for the status bar when there is something to tell
    /// the operator. Suppressed duplicates stay silent.
    pub fn handle_command(&mut self, cmd: UserCommand, now: DateTime<Utc>) -> Option<Notice> {
        let action = match cmd {
            UserCommand::Score {
                side,
                points,
                player,
            } => Action::Score {
                side,
                points,
                player,
            },
            UserCommand::Foul {
                side,
                foul_type,
                player,
            } => Action::Foul {
                side,
                foul_type,
                player,
            },
            UserCommand::ToggleClock => Action::ToggleClock,
            UserCommand::NextPeriod => Action::AdvancePeriod,
            UserCommand::ResetFouls => Action::ResetFouls,
            UserCommand::AdjustPeriodLength(delta) => {
                let current = self.session.settings.period_length_minutes;
                Action::SetDuration(current.saturating_add_signed(delta))
            }
            UserCommand::ToggleAntiDuplicate => {
                Action::SetAntiDuplicate(!self.session.settings.anti_duplicate)
            }
            UserCommand::AssignTeams { home, away } => Action::AssignTeams { home, away },
            UserCommand::ResetMatch => Action::Reset,
            UserCommand::Export => return Some(self.export(now)),
            UserCommand::AddTeam { name, logo } => {
                return Some(self.edit_roster(|db| {
                    db.add_team(&name, logo.as_deref())?;
                    Ok(format!("team {} added", name.trim()))
                }));
            }
            UserCommand::SetTeamLogo { team, logo } => {
                return Some(self.edit_roster(|db| {
                    db.set_logo(team, logo.as_deref())?;
                    Ok(match logo {
                        Some(logo) => format!("logo set to {logo}"),
                        None => "logo cleared".to_string(),
                    })
                }));
            }
            UserCommand::DeleteTeam(team) => {
                return Some(self.edit_roster(|db| {
                    if !db.delete_team(team)? {
                        anyhow::bail!("no team with id {team}");
                    }
                    Ok("team deleted".to_string())
                }));
            }
            UserCommand::AddPlayer { team, name, number } => {
                return Some(self.edit_roster(|db| {
                    db.add_player(team, &name, &number)?;
                    Ok(format!("player {} (#{}) added", name.trim(), number.trim()))
                }));
            }
            UserCommand::DeletePlayer(player) => {
                return Some(self.edit_roster(|db| {
                    if !db.delete_player(player)? {
                        anyhow::bail!("no player with id {player}");
                    }
                    Ok("player deleted".to_string())
                }));
            }
            UserCommand::Quit => return None,
        };

        match self.session.apply(action, &self.db, now) {
            Ok(_) => None,
            Err(e @ ActionError::PlayerRequired { .. }) => Some(Notice::error(e.to_string())),
            Err(e @ ActionError::UnknownTeam(_)) => {
                warn!("team assignment rejected: {e}");
                Some(Notice::error(e.to_string()))
            }
        }
    }

    /// Charge elapsed time to the clock.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Outcome {
        self.session.tick(now)
    }

    /// Run one roster edit against the database, then reload the team cache.
    ///
    /// Teams already on the scoreboard keep the name and logo they were
    /// assigned with; only their player lists follow the edit.
    fn edit_roster<F>(&mut self, edit: F) -> Notice
    where
        F: FnOnce(&Database) -> anyhow::Result<String>,
    {
        let notice = match edit(&self.db) {
            Ok(done) => {
                info!("Roster edit: {done}");
                Notice::info(done)
            }
            Err(e) => {
                warn!("roster edit failed: {e:#}");
                Notice::error(format!("{e:#}"))
            }
        };
        self.teams = self.db.teams();
        notice
    }

    fn export(&self, now: DateTime<Utc>) -> Notice {
        let dir = Path::new(&self.config.export_dir);
        match export::export_to_dir(dir, &self.session.stats, now) {
            Ok(paths) => Notice::info(format!("exported to {}", paths.history.display())),
            Err(e) => {
                warn!("export failed: {e:#}");
                Notice::error(format!("export failed: {e}"))
            }
        }
    }

    /// Build a snapshot of the current state for the TUI.
    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            game: self.session.snapshot(),
            teams: self.teams.clone(),
            home_roster: self.session.roster(Side::Home, &self.teams),
            away_roster: self.session.roster(Side::Away, &self.teams),
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the app loop until `Quit` arrives or the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let mut clock_tick = tokio::time::interval(Duration::from_millis(state.config.clock.tick_ms));
    clock_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        if let Some(notice) = state.handle_command(cmd, Utc::now()) {
                            let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
                        }
                        send_snapshot(&state, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            _ = clock_tick.tick() => {
                // Only a running clock changes between ticks.
                if state.session.clock().running {
                    if state.tick(Utc::now()) == Outcome::ClockExpired {
                        let _ = ui_tx.send(UiUpdate::Notice(Notice::info("period time expired"))).await;
                    }
                    send_snapshot(&state, &ui_tx).await;
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::StateSnapshot(Box::new(snapshot))).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use courtside_core::config::{ClockConfig, GameConfig, StatsConfig};
    use courtside_core::game::FoulType;
    use courtside_core::roster::{PlayerId, TeamId};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap() + ChronoDuration::milliseconds(ms)
    }

    fn test_config(export_dir: &str) -> Config {
        Config {
            game: GameConfig {
                period_length_minutes: 10,
                periods_total: 4,
                anti_duplicate: false,
                dedup_window_ms: 90,
                foul_limit: 5,
            },
            stats: StatsConfig {
                history_capacity: 20,
                sanctions_capacity: 30,
            },
            clock: ClockConfig { tick_ms: 10 },
            db_path: ":memory:".into(),
            export_dir: export_dir.into(),
            roster_import: None,
        }
    }

    /// App state with two seeded teams assigned home and away.
    fn create_test_app_state() -> (AppState, PlayerId, PlayerId) {
        let db = Database::open(":memory:").unwrap();
        let home = db.add_team("Leones", None).unwrap();
        let away = db.add_team("Aguilas", None).unwrap();
        let home_player = db.add_player(home, "Marta", "00").unwrap();
        let away_player = db.add_player(away, "Pablo", "7").unwrap();

        let mut state = AppState::new(test_config("exports"), db);
        state.handle_command(
            UserCommand::AssignTeams {
                home: Some(home),
                away: Some(away),
            },
            at(0),
        );
        (state, home_player, away_player)
    }

    #[test]
    fn score_command_updates_snapshot() {
        let (mut state, home_player, _) = create_test_app_state();
        let notice = state.handle_command(
            UserCommand::Score {
                side: Side::Home,
                points: 3,
                player: home_player,
            },
            at(1_000),
        );
        assert!(notice.is_none());
        let snap = state.build_snapshot();
        assert_eq!(snap.game.scoreboard.scores(), (3, 0));
        assert_eq!(snap.home_roster.len(), 1);
        assert_eq!(snap.teams.len(), 2);
    }

    #[test]
    fn wrong_player_reports_error_notice() {
        let (mut state, home_player, _) = create_test_app_state();
        let notice = state
            .handle_command(
                UserCommand::Foul {
                    side: Side::Away,
                    foul_type: FoulType::Personal,
                    player: home_player,
                },
                at(0),
            )
            .unwrap();
        assert!(notice.text.contains("player required"));
        assert_eq!(state.session.scoreboard.away.fouls, 0);
    }

    #[test]
    fn unknown_team_reports_error_notice() {
        let (mut state, _, _) = create_test_app_state();
        let notice = state.handle_command(
            UserCommand::AssignTeams {
                home: Some(TeamId(404)),
                away: None,
            },
            at(0),
        );
        assert!(notice.is_some());
        assert_eq!(state.session.scoreboard.home.name, "Leones");
    }

    #[test]
    fn adjust_period_length_clamps() {
        let (mut state, _, _) = create_test_app_state();
        state.handle_command(UserCommand::AdjustPeriodLength(1), at(0));
        assert_eq!(state.session.settings.period_length_minutes, 11);
        assert_eq!(state.session.clock().remaining_ms, 660_000);

        state.handle_command(UserCommand::AdjustPeriodLength(-100), at(0));
        assert_eq!(state.session.settings.period_length_minutes, 1);
    }

    #[test]
    fn toggle_anti_duplicate_flips_setting() {
        let (mut state, home_player, _) = create_test_app_state();
        state.handle_command(UserCommand::ToggleAntiDuplicate, at(0));
        assert!(state.session.settings.anti_duplicate);

        let score = UserCommand::Score {
            side: Side::Home,
            points: 2,
            player: home_player,
        };
        state.handle_command(score.clone(), at(100));
        state.handle_command(score, at(120));
        assert_eq!(state.session.scoreboard.home.score, 2);
    }

    #[test]
    fn toggle_clock_and_tick() {
        let (mut state, _, _) = create_test_app_state();
        state.handle_command(UserCommand::ToggleClock, at(0));
        assert!(state.session.clock().running);
        assert_eq!(state.tick(at(30_000)), Outcome::Applied);
        assert_eq!(state.build_snapshot().game.clock_display, "09:30");
    }

    #[test]
    fn export_writes_into_configured_dir() {
        let dir = std::env::temp_dir().join("courtside_app_export_test");
        let _ = std::fs::remove_dir_all(&dir);
        let (mut state, home_player, _) = create_test_app_state();
        state.config.export_dir = dir.display().to_string();
        state.handle_command(
            UserCommand::Score {
                side: Side::Home,
                points: 2,
                player: home_player,
            },
            at(0),
        );

        let notice = state.handle_command(UserCommand::Export, at(1_000)).unwrap();
        assert!(notice.text.starts_with("exported to"));
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn roster_commands_edit_database_and_snapshot() {
        let (mut state, _, _) = create_test_app_state();
        let notice = state
            .handle_command(
                UserCommand::AddTeam {
                    name: " Toros ".into(),
                    logo: None,
                },
                at(0),
            )
            .unwrap();
        assert_eq!(notice, Notice::info("team Toros added"));

        let toros = state
            .build_snapshot()
            .teams
            .into_iter()
            .find(|t| t.name == "Toros")
            .unwrap();
        state.handle_command(
            UserCommand::SetTeamLogo {
                team: toros.id,
                logo: Some("toros.png".into()),
            },
            at(0),
        );
        let notice = state
            .handle_command(
                UserCommand::AddPlayer {
                    team: toros.id,
                    name: "Ana Lopez".into(),
                    number: "23".into(),
                },
                at(0),
            )
            .unwrap();
        assert_eq!(notice, Notice::info("player Ana Lopez (#23) added"));

        let stored = state.db.load_team(toros.id).unwrap().unwrap();
        assert_eq!(stored.logo.as_deref(), Some("toros.png"));
        assert_eq!(stored.players.len(), 1);
        let snap = state.build_snapshot();
        assert!(snap.teams.iter().any(|t| t.id == toros.id && t.players.len() == 1));

        let ana = stored.players[0].id;
        state.handle_command(UserCommand::DeletePlayer(ana), at(0));
        assert!(state.db.load_team(toros.id).unwrap().unwrap().players.is_empty());
        state.handle_command(UserCommand::DeleteTeam(toros.id), at(0));
        assert!(state.build_snapshot().teams.iter().all(|t| t.name != "Toros"));
    }

    #[test]
    fn failed_roster_edits_report_errors() {
        let (mut state, home_player, _) = create_test_app_state();
        let home = state.session.scoreboard.home.team_id.unwrap();

        let duplicate = state
            .handle_command(
                UserCommand::AddTeam {
                    name: "Leones".into(),
                    logo: None,
                },
                at(0),
            )
            .unwrap();
        assert_eq!(duplicate.level, crate::protocol::NoticeLevel::Error);

        let numberless = state
            .handle_command(
                UserCommand::AddPlayer {
                    team: home,
                    name: "Ines".into(),
                    number: " ".into(),
                },
                at(0),
            )
            .unwrap();
        assert!(numberless.text.contains("number"));

        let gone = state
            .handle_command(UserCommand::DeletePlayer(PlayerId(999)), at(0))
            .unwrap();
        assert_eq!(gone, Notice::error("no player with id 999"));
        assert_eq!(state.build_snapshot().home_roster[0].id, home_player);
    }

    #[test]
    fn late_player_can_score_after_being_added() {
        let (mut state, _, _) = create_test_app_state();
        let home = state.session.scoreboard.home.team_id.unwrap();
        state.handle_command(
            UserCommand::AddPlayer {
                team: home,
                name: "Luz".into(),
                number: "9".into(),
            },
            at(0),
        );

        let snap = state.build_snapshot();
        assert_eq!(snap.home_roster.len(), 2);
        let luz = snap.home_roster[0].id;
        let notice = state.handle_command(
            UserCommand::Score {
                side: Side::Home,
                points: 2,
                player: luz,
            },
            at(1_000),
        );
        assert!(notice.is_none());
        assert_eq!(state.session.scoreboard.home.score, 2);
        assert_eq!(state.session.scoreboard.home.name, "Leones");
    }

    #[test]
    fn snapshots_read_the_team_cache() {
        let (mut state, _, _) = create_test_app_state();
        let home = state.session.scoreboard.home.team_id.unwrap();

        // Written behind the app's back: not visible until the next edit
        state.db.add_player(home, "Rosa", "8").unwrap();
        assert_eq!(state.build_snapshot().home_roster.len(), 1);

        state.handle_command(
            UserCommand::AddPlayer {
                team: home,
                name: "Luz".into(),
                number: "9".into(),
            },
            at(0),
        );
        assert_eq!(state.build_snapshot().home_roster.len(), 3);
    }

    #[tokio::test]
    async fn run_sends_snapshot_and_stops_on_quit() {
        let (state, home_player, _) = create_test_app_state();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(cmd_rx, ui_tx, state));

        let first = ui_rx.recv().await.unwrap();
        assert!(matches!(first, UiUpdate::StateSnapshot(_)));

        cmd_tx
            .send(UserCommand::Score {
                side: Side::Home,
                points: 2,
                player: home_player,
            })
            .await
            .unwrap();
        let scored = loop {
            match ui_rx.recv().await.unwrap() {
                UiUpdate::StateSnapshot(snap) if snap.game.scoreboard.home.score == 2 => break snap,
                _ => continue,
            }
        };
        assert_eq!(scored.game.stats.history.len(), 1);

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn running_clock_pushes_tick_snapshots() {
        tokio::time::pause();
        let (state, _, _) = create_test_app_state();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(cmd_rx, ui_tx, state));
        let _initial = ui_rx.recv().await.unwrap();

        cmd_tx.send(UserCommand::ToggleClock).await.unwrap();
        let _toggled = ui_rx.recv().await.unwrap();

        // No further commands: the next snapshot comes from the tick interval
        tokio::time::advance(Duration::from_millis(25)).await;
        match ui_rx.recv().await.unwrap() {
            UiUpdate::StateSnapshot(snap) => assert!(snap.game.scoreboard.clock.running),
            other => panic!("expected a snapshot, got {other:?}"),
        }

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        handle.await.unwrap().unwrap();
    }
}
