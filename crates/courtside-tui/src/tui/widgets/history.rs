// Scoring history widget: newest entries first.
//
// Each row: "HH:MM:SS Q1 HOME +3  12-8  #00 Marta Ruiz"
// Green for points, red for corrections.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use courtside_core::export::format_timestamp;
use courtside_core::game::ScoreEvent;

use crate::tui::ViewState;

/// Render the scoring history into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let history = state.snapshot.as_ref().map(|s| &s.game.stats.history);
    let Some(history) = history.filter(|h| !h.is_empty()) else {
        let paragraph = Paragraph::new("  No scoring yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("History"));
        frame.render_widget(paragraph, area);
        return;
    };

    // Visible row count: subtract 2 for borders
    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let items: Vec<ListItem> = history
        .iter()
        .take(visible_rows)
        .map(|event| {
            let color = if event.delta < 0 {
                Color::Red
            } else {
                Color::Green
            };
            ListItem::new(Line::from(Span::styled(
                format_event(event),
                Style::default().fg(color),
            )))
        })
        .collect();

    let title = format!("History ({}/{})", history.len(), history.capacity());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

/// Format a single scoring event for display.
pub fn format_event(event: &ScoreEvent) -> String {
    format!(
        "{} Q{} {} {:+}  {}-{}  #{} {}",
        format_timestamp(event.at),
        event.period,
        event.side.label(),
        event.delta,
        event.score_home,
        event.score_away,
        event.player_number,
        event.player_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::{buffer_text, sample_snapshot};
    use chrono::{TimeZone, Utc};
    use courtside_core::game::Side;

    #[test]
    fn format_event_shows_delta_and_score() {
        let event = ScoreEvent {
            at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            period: 2,
            side: Side::Away,
            delta: -1,
            score_home: 12,
            score_away: 7,
            player_name: "Pablo Gil".into(),
            player_number: "3".into(),
        };
        let text = format_event(&event);
        assert!(text.ends_with("Q2 AWAY -1  12-7  #3 Pablo Gil"), "got {text}");
    }

    #[test]
    fn renders_entries_and_empty_state() {
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
        assert!(text.contains("History (1/20)"));
        assert!(text.contains("Marta Ruiz"));

        terminal
            .draw(|frame| render(frame, frame.area(), &ViewState::default()))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("No scoring yet."));
    }
}
