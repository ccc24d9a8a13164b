// Player picker overlay: choose who a pending score or foul is credited to.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};
use ratatui::Frame;

use courtside_core::roster::Player;

use super::centered_rect;
use crate::tui::{PendingEntry, ViewState};

const DIALOG_WIDTH: u16 = 40;
/// Rows shown before the list scrolls.
const MAX_VISIBLE: u16 = 12;

/// Render the picker for `pending` with `cursor` highlighted.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    state: &ViewState,
    pending: PendingEntry,
    cursor: usize,
) {
    let roster = state
        .snapshot
        .as_ref()
        .map_or(&[][..], |s| s.roster(pending.side()));

    let height = (roster.len() as u16).clamp(1, MAX_VISIBLE) + 2;
    let dialog_area = centered_rect(DIALOG_WIDTH, height, area);
    frame.render_widget(Clear, dialog_area);

    let items: Vec<ListItem> = roster.iter().map(|p| ListItem::new(player_line(p))).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} ", pending.describe())),
        )
        .style(Style::default().bg(Color::Black))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(cursor));
    frame.render_stateful_widget(list, dialog_area, &mut list_state);
}

/// One roster row: `#00  Marta Ruiz`.
pub fn player_line(player: &Player) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("#{:<3}", player.number),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" "),
        Span::raw(player.name.clone()),
    ])
}
