// Team picker overlay: put stored teams on the home and away sides.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use courtside_core::roster::Team;

use super::centered_rect;
use crate::tui::{TeamPick, ViewState};

const DIALOG_WIDTH: u16 = 46;
const MAX_VISIBLE: u16 = 14;

/// Render the team picker with the choices made so far.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, pick: &TeamPick) {
    let teams = state.snapshot.as_ref().map_or(&[][..], |s| &s.teams[..]);

    let height = (teams.len() as u16).clamp(1, MAX_VISIBLE) + 3;
    let dialog_area = centered_rect(DIALOG_WIDTH, height, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Assign teams ");

    if teams.is_empty() {
        let paragraph = Paragraph::new("  No teams stored. Import a roster file.")
            .style(Style::default().fg(Color::DarkGray).bg(Color::Black))
            .block(block);
        frame.render_widget(paragraph, dialog_area);
        return;
    }

    let items: Vec<ListItem> = teams
        .iter()
        .map(|team| ListItem::new(team_line(team, pick)))
        .collect();
    let list = List::new(items)
        .block(block.title_bottom(" h:home a:away x:clear Enter:apply "))
        .style(Style::default().bg(Color::Black))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(pick.cursor));
    frame.render_stateful_widget(list, dialog_area, &mut list_state);
}

/// Team row with a side marker when chosen, e.g. `[H] Leones (5)`.
pub fn team_line(team: &Team, pick: &TeamPick) -> Line<'static> {
    let (marker, color) = if pick.home == Some(team.id) {
        ("[H]", Color::Green)
    } else if pick.away == Some(team.id) {
        ("[A]", Color::Magenta)
    } else {
        ("   ", Color::White)
    };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(color)),
        Span::raw(format!(" {} ({})", team.name, team.players.len())),
    ])
}
