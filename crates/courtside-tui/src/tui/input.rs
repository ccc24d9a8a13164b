// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// loop, or into local ViewState changes (side selection, pickers, panels).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use courtside_core::game::{FoulType, Side};
use courtside_core::roster::TeamId;

use super::{EditorFocus, EditorPrompt, InputMode, PendingEntry, RosterEdit, TeamPick, ViewState};
use crate::protocol::{Notice, UserCommand};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app loop. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    match view_state.mode {
        InputMode::PlayerPicker { pending, cursor } => {
            handle_player_picker(key_event, view_state, pending, cursor)
        }
        InputMode::TeamPicker(pick) => handle_team_picker(key_event, view_state, pick),
        InputMode::RosterEditor(_) => handle_roster_editor(key_event, view_state),
        InputMode::Normal => handle_normal(key_event, view_state),
    }
}

fn handle_normal(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let side = view_state.selected_side;
    match key_event.code {
        // Side selection
        KeyCode::Char('h') => {
            view_state.selected_side = Side::Home;
            None
        }
        KeyCode::Char('a') => {
            view_state.selected_side = Side::Away;
            None
        }
        KeyCode::Tab => {
            view_state.selected_side = side.other();
            None
        }

        // Scoring and fouls go through the player picker
        KeyCode::Char(c @ '1'..='3') => {
            let points = i32::from(c as u8 - b'0');
            open_player_picker(view_state, PendingEntry::Score { side, points })
        }
        // Score correction
        KeyCode::Char('-') => {
            open_player_picker(view_state, PendingEntry::Score { side, points: -1 })
        }
        KeyCode::Char('p') => open_player_picker(
            view_state,
            PendingEntry::Foul {
                side,
                foul_type: FoulType::Personal,
            },
        ),
        KeyCode::Char('t') => open_player_picker(
            view_state,
            PendingEntry::Foul {
                side,
                foul_type: FoulType::Technical,
            },
        ),
        KeyCode::Char('u') => open_player_picker(
            view_state,
            PendingEntry::Foul {
                side,
                foul_type: FoulType::Unsportsmanlike,
            },
        ),

        // Clock and period
        KeyCode::Char(' ') => Some(UserCommand::ToggleClock),
        KeyCode::Char('n') => Some(UserCommand::NextPeriod),
        KeyCode::Char('f') => Some(UserCommand::ResetFouls),
        KeyCode::Char('[') => Some(UserCommand::AdjustPeriodLength(-1)),
        KeyCode::Char(']') => Some(UserCommand::AdjustPeriodLength(1)),

        KeyCode::Char('d') => Some(UserCommand::ToggleAntiDuplicate),
        KeyCode::Char('g') => {
            open_team_picker(view_state);
            None
        }
        KeyCode::Char('r') => {
            if view_state.snapshot.is_some() {
                view_state.mode = InputMode::RosterEditor(RosterEdit::default());
            }
            None
        }
        KeyCode::Char('s') => {
            view_state.show_stats = !view_state.show_stats;
            None
        }
        KeyCode::Char('e') => Some(UserCommand::Export),
        KeyCode::Char('R') => Some(UserCommand::ResetMatch),

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// Open the player picker for `pending`, or refuse when the side has nobody
/// to credit.
fn open_player_picker(view_state: &mut ViewState, pending: PendingEntry) -> Option<UserCommand> {
    let snapshot = view_state.snapshot.as_ref()?;
    if snapshot.roster(pending.side()).is_empty() {
        view_state.notice = Some(Notice::error(format!(
            "player required: no roster for {}",
            pending.side().label()
        )));
        return None;
    }
    view_state.mode = InputMode::PlayerPicker { pending, cursor: 0 };
    None
}

fn open_team_picker(view_state: &mut ViewState) {
    let Some(snapshot) = view_state.snapshot.as_ref() else {
        return;
    };
    let board = &snapshot.game.scoreboard;
    view_state.mode = InputMode::TeamPicker(TeamPick {
        cursor: 0,
        home: board.home.team_id,
        away: board.away.team_id,
    });
}

/// Handle key events while the player picker is open.
///
/// - `j`/`k` or arrows move the cursor
/// - `Enter` sends the pending score or foul for the highlighted player
/// - `Esc` cancels
fn handle_player_picker(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    pending: PendingEntry,
    cursor: usize,
) -> Option<UserCommand> {
    let roster_len = view_state
        .snapshot
        .as_ref()
        .map_or(0, |s| s.roster(pending.side()).len());

    match key_event.code {
        KeyCode::Esc => {
            view_state.mode = InputMode::Normal;
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.mode = InputMode::PlayerPicker {
                pending,
                cursor: cursor.saturating_sub(1),
            };
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_state.mode = InputMode::PlayerPicker {
                pending,
                cursor: (cursor + 1).min(roster_len.saturating_sub(1)),
            };
            None
        }
        KeyCode::Enter => {
            let player = view_state
                .snapshot
                .as_ref()
                .and_then(|s| s.roster(pending.side()).get(cursor))
                .map(|p| p.id)?;
            view_state.mode = InputMode::Normal;
            Some(match pending {
                PendingEntry::Score { side, points } => UserCommand::Score {
                    side,
                    points,
                    player,
                },
                PendingEntry::Foul { side, foul_type } => UserCommand::Foul {
                    side,
                    foul_type,
                    player,
                },
            })
        }
        _ => None,
    }
}

/// Handle key events while the team picker is open.
///
/// - `j`/`k` or arrows move the cursor
/// - `h`/`a` put the highlighted team on the home/away side
/// - `x` clears both sides
/// - `Enter` applies the assignment, `Esc` cancels
fn handle_team_picker(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    mut pick: TeamPick,
) -> Option<UserCommand> {
    let teams: Vec<_> = view_state
        .snapshot
        .as_ref()
        .map(|s| s.teams.iter().map(|t| t.id).collect())
        .unwrap_or_default();
    let highlighted = teams.get(pick.cursor).copied();

    match key_event.code {
        KeyCode::Esc => {
            view_state.mode = InputMode::Normal;
            return None;
        }
        KeyCode::Enter => {
            view_state.mode = InputMode::Normal;
            return Some(UserCommand::AssignTeams {
                home: pick.home,
                away: pick.away,
            });
        }
        KeyCode::Up | KeyCode::Char('k') => pick.cursor = pick.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            pick.cursor = (pick.cursor + 1).min(teams.len().saturating_sub(1));
        }
        KeyCode::Char('h') if highlighted.is_some() => pick.home = highlighted,
        KeyCode::Char('a') if highlighted.is_some() => pick.away = highlighted,
        KeyCode::Char('x') => {
            pick.home = None;
            pick.away = None;
        }
        _ => {}
    }
    view_state.mode = InputMode::TeamPicker(pick);
    None
}

/// Handle key events while the roster editor is open.
///
/// - `j`/`k` or arrows move the cursor in the focused list
/// - `Tab` switches focus between teams and players
/// - `n` names a new team, `p` adds a player to the highlighted team,
///   `l` sets its logo
/// - `x` deletes the highlighted team or player
/// - `Esc` closes the editor
fn handle_roster_editor(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let InputMode::RosterEditor(mut edit) = std::mem::take(&mut view_state.mode) else {
        return None;
    };

    let team = view_state
        .snapshot
        .as_ref()
        .and_then(|s| s.teams.get(edit.team_cursor));
    let team_id = team.map(|t| t.id);
    let player_id = team
        .and_then(|t| t.players.get(edit.player_cursor))
        .map(|p| p.id);
    let team_count = view_state.snapshot.as_ref().map_or(0, |s| s.teams.len());
    let player_count = team.map_or(0, |t| t.players.len());

    if let Some(prompt) = edit.prompt {
        let cmd = match key_event.code {
            KeyCode::Esc => {
                edit.prompt = None;
                edit.input.clear();
                None
            }
            KeyCode::Backspace => {
                edit.input.pop();
                None
            }
            KeyCode::Char(c) => {
                edit.input.push(c);
                None
            }
            KeyCode::Enter => {
                let input = std::mem::take(&mut edit.input);
                edit.prompt = None;
                match prompt_command(prompt, &input, team_id) {
                    Ok(cmd) => Some(cmd),
                    Err(message) => {
                        view_state.notice = Some(Notice::error(message));
                        None
                    }
                }
            }
            _ => None,
        };
        view_state.mode = InputMode::RosterEditor(edit);
        return cmd;
    }

    let cmd = match key_event.code {
        KeyCode::Esc => return None,
        KeyCode::Tab => {
            edit.focus = match edit.focus {
                EditorFocus::Teams => EditorFocus::Players,
                EditorFocus::Players => EditorFocus::Teams,
            };
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            match edit.focus {
                EditorFocus::Teams => {
                    edit.team_cursor = edit.team_cursor.saturating_sub(1);
                    edit.player_cursor = 0;
                }
                EditorFocus::Players => edit.player_cursor = edit.player_cursor.saturating_sub(1),
            }
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            match edit.focus {
                EditorFocus::Teams => {
                    edit.team_cursor = (edit.team_cursor + 1).min(team_count.saturating_sub(1));
                    edit.player_cursor = 0;
                }
                EditorFocus::Players => {
                    edit.player_cursor =
                        (edit.player_cursor + 1).min(player_count.saturating_sub(1));
                }
            }
            None
        }
        KeyCode::Char('n') => {
            edit.prompt = Some(EditorPrompt::TeamName);
            None
        }
        KeyCode::Char('p') if team_id.is_some() => {
            edit.prompt = Some(EditorPrompt::Player);
            None
        }
        KeyCode::Char('l') if team_id.is_some() => {
            edit.prompt = Some(EditorPrompt::Logo);
            None
        }
        KeyCode::Char('x') => match edit.focus {
            EditorFocus::Teams => team_id.map(UserCommand::DeleteTeam),
            EditorFocus::Players => player_id.map(UserCommand::DeletePlayer),
        },
        _ => None,
    };
    view_state.mode = InputMode::RosterEditor(edit);
    cmd
}

/// Turn submitted prompt text into a roster command, or explain what is
/// missing.
fn prompt_command(
    prompt: EditorPrompt,
    input: &str,
    team: Option<TeamId>,
) -> Result<UserCommand, String> {
    let input = input.trim();
    match prompt {
        EditorPrompt::TeamName => {
            if input.is_empty() {
                return Err("team name required".to_string());
            }
            Ok(UserCommand::AddTeam {
                name: input.to_string(),
                logo: None,
            })
        }
        EditorPrompt::Logo => {
            let team = team.ok_or("no team selected")?;
            Ok(UserCommand::SetTeamLogo {
                team,
                logo: (!input.is_empty()).then(|| input.to_string()),
            })
        }
        EditorPrompt::Player => {
            let team = team.ok_or("no team selected")?;
            match input.split_once(char::is_whitespace) {
                Some((number, name)) if !name.trim().is_empty() => Ok(UserCommand::AddPlayer {
                    team,
                    name: name.trim().to_string(),
                    number: number.to_string(),
                }),
                _ => Err("enter a jersey number then a name, e.g. 23 Ana Lopez".to_string()),
            }
        }
    }
}

/// Handle key events while in quit confirmation mode.
///
/// - `y` or `q` confirms quit
/// - `n` or `Esc` cancels
/// - All other keys are blocked
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
