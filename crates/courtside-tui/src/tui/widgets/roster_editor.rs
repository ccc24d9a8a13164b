// Roster editor overlay: stored teams on the left, the highlighted team's
// players on the right, and a one-line prompt for typed input.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use courtside_core::roster::Team;

use super::centered_rect;
use crate::tui::{EditorFocus, RosterEdit, ViewState};

const DIALOG_WIDTH: u16 = 72;
const DIALOG_HEIGHT: u16 = 20;

/// Render the roster editor.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, edit: &RosterEdit) {
    let teams = state.snapshot.as_ref().map_or(&[][..], |s| &s.teams[..]);
    let highlighted = teams.get(edit.team_cursor);

    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Rosters ")
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let [lists_area, prompt_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(inner);
    let [teams_area, players_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(lists_area);

    // Teams
    let team_items: Vec<ListItem> = teams
        .iter()
        .map(|team| ListItem::new(format!("{} ({})", team.name, team.players.len())))
        .collect();
    let teams_list = List::new(team_items)
        .block(panel_block(" Teams ", edit.focus == EditorFocus::Teams))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut teams_state =
        ListState::default().with_selected((!teams.is_empty()).then_some(edit.team_cursor));
    frame.render_stateful_widget(teams_list, teams_area, &mut teams_state);

    // Players of the highlighted team
    let players = highlighted.map_or(&[][..], |t| &t.players[..]);
    let player_items: Vec<ListItem> = players
        .iter()
        .map(|p| ListItem::new(format!("#{} {}", p.number, p.name)))
        .collect();
    let players_list = List::new(player_items)
        .block(panel_block(
            &players_title(highlighted),
            edit.focus == EditorFocus::Players,
        ))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let selected = (edit.focus == EditorFocus::Players && !players.is_empty())
        .then_some(edit.player_cursor);
    let mut players_state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(players_list, players_area, &mut players_state);

    frame.render_widget(Paragraph::new(prompt_line(edit)), prompt_area);
}

fn panel_block(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string())
}

/// Player panel title naming the team and its logo, e.g.
/// ` Leones [leones.png] `.
pub fn players_title(team: Option<&Team>) -> String {
    match team {
        Some(Team {
            name,
            logo: Some(logo),
            ..
        }) => format!(" {name} [{logo}] "),
        Some(team) => format!(" {} ", team.name),
        None => " No teams stored ".to_string(),
    }
}

/// The typed text with its label, or nothing when no prompt is open.
pub fn prompt_line(edit: &RosterEdit) -> Line<'static> {
    match edit.prompt {
        Some(prompt) => Line::from(vec![
            Span::styled(
                format!(" {}: ", prompt.label()),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!("{}_", edit.input)),
        ]),
        None => Line::default(),
    }
}
