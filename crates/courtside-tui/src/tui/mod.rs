// TUI scoreboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the latest snapshot pushed by the app
// loop plus purely local UI state (selected side, open pickers, overlays).
// Updates arrive over an mpsc channel and the screen re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::warn;

use courtside_core::game::{FoulType, Side};
use courtside_core::roster::TeamId;

use crate::protocol::{AppSnapshot, Notice, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// Input modes
// ---------------------------------------------------------------------------

/// A score or foul waiting for the operator to pick the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingEntry {
    Score { side: Side, points: i32 },
    Foul { side: Side, foul_type: FoulType },
}

impl PendingEntry {
    pub fn side(&self) -> Side {
        match *self {
            PendingEntry::Score { side, .. } | PendingEntry::Foul { side, .. } => side,
        }
    }

    /// Short description for the picker title, e.g. `+3 HOME`.
    pub fn describe(&self) -> String {
        match *self {
            PendingEntry::Score { side, points } => format!("{points:+} {}", side.label()),
            PendingEntry::Foul { side, foul_type } => {
                format!("{foul_type} foul {}", side.label())
            }
        }
    }
}

/// Team picker state: a cursor over the team list plus the choices so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamPick {
    pub cursor: usize,
    pub home: Option<TeamId>,
    pub away: Option<TeamId>,
}

/// Which list the roster editor's cursor keys move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorFocus {
    #[default]
    Teams,
    Players,
}

/// Text the roster editor is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPrompt {
    TeamName,
    Logo,
    /// Jersey number, then the player's name.
    Player,
}

impl EditorPrompt {
    pub fn label(self) -> &'static str {
        match self {
            EditorPrompt::TeamName => "New team",
            EditorPrompt::Logo => "Logo (empty clears)",
            EditorPrompt::Player => "Number and name",
        }
    }
}

/// Roster editor state: cursors over the team list and the highlighted
/// team's players, plus any text being typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterEdit {
    pub team_cursor: usize,
    pub player_cursor: usize,
    pub focus: EditorFocus,
    pub prompt: Option<EditorPrompt>,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    PlayerPicker { pending: PendingEntry, cursor: usize },
    TeamPicker(TeamPick),
    RosterEditor(RosterEdit),
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state read by `render_frame`.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Latest snapshot from the app loop; `None` until the first arrives.
    pub snapshot: Option<AppSnapshot>,
    /// Side that score and foul keys apply to.
    pub selected_side: Side,
    pub mode: InputMode,
    /// Show the statistics panel in place of the sanction log.
    pub show_stats: bool,
    /// Whether the quit confirmation dialog is showing.
    pub confirm_quit: bool,
    /// Last notice shown in the status bar.
    pub notice: Option<Notice>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            snapshot: None,
            selected_side: Side::Home,
            mode: InputMode::Normal,
            show_stats: false,
            confirm_quit: false,
            notice: None,
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.snapshot = Some(*snapshot);
            clamp_cursors(state);
        }
        UiUpdate::Notice(notice) => {
            state.notice = Some(notice);
        }
    }
}

// Rosters can shrink under an open picker; keep the cursor on a real row.
fn clamp_cursors(state: &mut ViewState) {
    let Some(snapshot) = state.snapshot.as_ref() else {
        return;
    };
    match &mut state.mode {
        InputMode::PlayerPicker { pending, cursor } => {
            let len = snapshot.roster(pending.side()).len();
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
        InputMode::TeamPicker(pick) => {
            pick.cursor = pick.cursor.min(snapshot.teams.len().saturating_sub(1));
        }
        InputMode::RosterEditor(edit) => {
            edit.team_cursor = edit.team_cursor.min(snapshot.teams.len().saturating_sub(1));
            let players = snapshot
                .teams
                .get(edit.team_cursor)
                .map_or(0, |t| t.players.len());
            edit.player_cursor = edit.player_cursor.min(players.saturating_sub(1));
        }
        InputMode::Normal => {}
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete scoreboard frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::scoreboard::render(frame, layout.scoreboard, state);
    widgets::history::render(frame, layout.history, state);
    if state.show_stats {
        widgets::stats::render(frame, layout.side_panel, state);
    } else {
        widgets::sanctions::render(frame, layout.side_panel, state);
    }
    widgets::help_bar::render(frame, layout.help_bar, state);

    match state.mode {
        InputMode::PlayerPicker { pending, cursor } => {
            widgets::player_picker::render(frame, frame.area(), state, pending, cursor);
        }
        InputMode::TeamPicker(pick) => {
            widgets::team_picker::render(frame, frame.area(), state, &pick);
        }
        InputMode::RosterEditor(ref edit) => {
            widgets::roster_editor::render(frame, frame.area(), state, edit);
        }
        InputMode::Normal => {}
    }

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook that restores the terminal.
/// 3. Runs an async select loop over UI updates, keyboard input and renders.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Chain a terminal-restoring panic hook before the original one
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    // 3. Render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App loop is gone
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            if cmd_tx.send(cmd).await.is_err() || quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("terminal input error: {e}");
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    // 4. Restore terminal
    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use courtside_core::game::MatchSession;
    use courtside_core::roster::{Player, PlayerId, Team};

    fn team(id: i64, name: &str, players: &[(i64, &str, &str)]) -> Team {
        Team {
            id: TeamId(id),
            name: name.into(),
            logo: None,
            players: players
                .iter()
                .map(|&(pid, name, number)| Player {
                    id: PlayerId(pid),
                    name: name.into(),
                    number: number.into(),
                })
                .collect(),
        }
    }

    /// A snapshot with two assigned teams and a little history, shared by
    /// the widget tests.
    pub(crate) fn sample_snapshot() -> AppSnapshot {
        let teams = vec![
            team(1, "Leones", &[(10, "Marta Ruiz", "00"), (11, "Ines Salas", "4")]),
            team(2, "Aguilas", &[(20, "Pablo Gil", "3")]),
        ];
        let mut session = MatchSession::default();
        session
            .assign_teams(Some(TeamId(1)), Some(TeamId(2)), teams.as_slice())
            .unwrap();
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        session
            .submit_score(Side::Home, 3, PlayerId(10), teams.as_slice(), at)
            .unwrap();
        session
            .submit_foul(Side::Away, FoulType::Technical, PlayerId(20), teams.as_slice(), at)
            .unwrap();

        AppSnapshot {
            game: session.snapshot(),
            home_roster: session.roster(Side::Home, teams.as_slice()),
            away_roster: session.roster(Side::Away, teams.as_slice()),
            teams,
        }
    }

    /// Render the whole frame into a test backend.
    pub(crate) fn draw(state: &ViewState, width: u16, height: u16) -> ratatui::buffer::Buffer {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(|frame| render_frame(frame, state)).unwrap();
        terminal.backend().buffer().clone()
    }

    pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.snapshot.is_none());
        assert_eq!(state.selected_side, Side::Home);
        assert_eq!(state.mode, InputMode::Normal);
        assert!(!state.show_stats);
        assert!(!state.confirm_quit);
        assert!(state.notice.is_none());
    }

    #[test]
    fn apply_ui_update_state_snapshot() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::StateSnapshot(Box::new(sample_snapshot())),
        );
        let snap = state.snapshot.as_ref().unwrap();
        assert_eq!(snap.game.scoreboard.home.score, 3);
    }

    #[test]
    fn apply_ui_update_notice_replaces_previous() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Notice(Notice::info("first")));
        apply_ui_update(&mut state, UiUpdate::Notice(Notice::error("second")));
        assert_eq!(state.notice, Some(Notice::error("second")));
    }

    #[test]
    fn snapshot_clamps_open_player_picker() {
        let mut state = ViewState {
            mode: InputMode::PlayerPicker {
                pending: PendingEntry::Score {
                    side: Side::Away,
                    points: 2,
                },
                cursor: 7,
            },
            ..ViewState::default()
        };
        apply_ui_update(
            &mut state,
            UiUpdate::StateSnapshot(Box::new(sample_snapshot())),
        );
        assert!(matches!(
            state.mode,
            InputMode::PlayerPicker { cursor: 0, .. }
        ));
    }

    #[test]
    fn snapshot_clamps_roster_editor_after_delete() {
        let mut state = ViewState {
            mode: InputMode::RosterEditor(RosterEdit {
                team_cursor: 4,
                player_cursor: 3,
                focus: EditorFocus::Players,
                ..RosterEdit::default()
            }),
            ..ViewState::default()
        };
        apply_ui_update(
            &mut state,
            UiUpdate::StateSnapshot(Box::new(sample_snapshot())),
        );
        // Last team is Aguilas with a single player
        match &state.mode {
            InputMode::RosterEditor(edit) => {
                assert_eq!(edit.team_cursor, 1);
                assert_eq!(edit.player_cursor, 0);
            }
            other => panic!("editor closed unexpectedly: {other:?}"),
        }
    }

    #[test]
    fn pending_entry_describe() {
        let score = PendingEntry::Score {
            side: Side::Home,
            points: 3,
        };
        assert_eq!(score.describe(), "+3 HOME");
        let foul = PendingEntry::Foul {
            side: Side::Away,
            foul_type: FoulType::Personal,
        };
        assert_eq!(foul.side(), Side::Away);
        assert_eq!(foul.describe(), "Personal foul AWAY");
    }

    #[test]
    fn render_frame_without_snapshot() {
        let text = buffer_text(&draw(&ViewState::default(), 100, 30));
        assert!(text.contains("Waiting for match state"));
    }

    #[test]
    fn render_frame_with_overlays() {
        let state = ViewState {
            snapshot: Some(sample_snapshot()),
            mode: InputMode::TeamPicker(TeamPick::default()),
            confirm_quit: true,
            ..ViewState::default()
        };
        let text = buffer_text(&draw(&state, 100, 30));
        assert!(text.contains("Quit?"));
    }

    #[test]
    fn render_frame_roster_editor() {
        let state = ViewState {
            snapshot: Some(sample_snapshot()),
            mode: InputMode::RosterEditor(RosterEdit::default()),
            ..ViewState::default()
        };
        let text = buffer_text(&draw(&state, 100, 30));
        assert!(text.contains("Rosters"));
        assert!(text.contains("#00 Marta Ruiz"));
    }

    #[test]
    fn render_frame_stats_panel() {
        let state = ViewState {
            snapshot: Some(sample_snapshot()),
            show_stats: true,
            ..ViewState::default()
        };
        let text = buffer_text(&draw(&state, 100, 30));
        assert!(text.contains("Statistics"));
        assert!(text.contains("Leones"));
    }
}
