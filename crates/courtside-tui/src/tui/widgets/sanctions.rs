// Sanction log widget: newest fouls first, colored by foul type.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use courtside_core::export::format_timestamp;
use courtside_core::game::{FoulEvent, FoulType};

use crate::tui::ViewState;

/// Render the sanction log into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let sanctions = state.snapshot.as_ref().map(|s| &s.game.stats.sanctions);
    let Some(sanctions) = sanctions.filter(|log| !log.is_empty()) else {
        let paragraph = Paragraph::new("  No fouls yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Sanctions"));
        frame.render_widget(paragraph, area);
        return;
    };

    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let items: Vec<ListItem> = sanctions
        .iter()
        .take(visible_rows)
        .map(|event| {
            ListItem::new(Line::from(Span::styled(
                format_foul(event),
                Style::default().fg(foul_color(event.foul_type)),
            )))
        })
        .collect();

    let title = format!("Sanctions ({})", sanctions.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

pub fn format_foul(event: &FoulEvent) -> String {
    format!(
        "{} Q{} {} {}  #{} {}",
        format_timestamp(event.at),
        event.period,
        event.side.label(),
        event.foul_type,
        event.player_number,
        event.player_name,
    )
}

pub fn foul_color(foul_type: FoulType) -> Color {
    match foul_type {
        FoulType::Personal => Color::White,
        FoulType::Technical => Color::Yellow,
        FoulType::Unsportsmanlike => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::{buffer_text, sample_snapshot};

    #[test]
    fn renders_latest_foul() {
        let backend = ratatui::backend::TestBackend::new(70, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState {
            snapshot: Some(sample_snapshot()),
            ..ViewState::default()
        };
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Sanctions (1)"));
        assert!(text.contains("AWAY Technical  #3 Pablo Gil"));
    }

    #[test]
    fn foul_colors_distinguish_types() {
        assert_ne!(
            foul_color(FoulType::Personal),
            foul_color(FoulType::Unsportsmanlike)
        );
    }

    #[test]
    fn empty_state() {
        let backend = ratatui::backend::TestBackend::new(40, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &ViewState::default()))
            .unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("No fouls yet."));
    }
}
