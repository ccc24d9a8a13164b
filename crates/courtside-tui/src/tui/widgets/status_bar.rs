// Status bar widget: period, clock state, anti-duplicate flag and the
// latest notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use courtside_core::game::MatchSettings;

use crate::protocol::{Notice, NoticeLevel};
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [clock dot] [period] | [dedup flag] | [period length] | [notice]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    match state.snapshot.as_ref() {
        Some(snapshot) => {
            let game = &snapshot.game;
            let (dot, dot_color) = clock_indicator(game.scoreboard.clock.running);
            spans.push(Span::styled(format!(" {dot} "), Style::default().fg(dot_color)));
            spans.push(Span::styled(
                format!("Period {}/{}", game.scoreboard.period, game.settings.periods_total),
                Style::default().fg(Color::White),
            ));
            spans.push(separator());
            spans.push(dedup_span(&game.settings));
            spans.push(separator());
            spans.push(Span::styled(
                format!("{} min periods", game.settings.period_length_minutes),
                Style::default().fg(Color::White),
            ));
        }
        None => spans.push(Span::styled(
            " Connecting...",
            Style::default().fg(Color::DarkGray),
        )),
    }

    if let Some(notice) = state.notice.as_ref() {
        spans.push(separator());
        spans.push(notice_span(notice));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

fn separator() -> Span<'static> {
    Span::styled(" | ", Style::default().fg(Color::Gray))
}

/// Clock dot: green while running, yellow when stopped.
pub fn clock_indicator(running: bool) -> (&'static str, Color) {
    if running {
        ("●", Color::Green)
    } else {
        ("●", Color::Yellow)
    }
}

pub fn dedup_span(settings: &MatchSettings) -> Span<'static> {
    if settings.anti_duplicate {
        Span::styled(
            format!("Dedup ON ({}ms)", settings.dedup_window_ms),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("Dedup OFF", Style::default().fg(Color::DarkGray))
    }
}

pub fn notice_span(notice: &Notice) -> Span<'static> {
    let style = match notice.level {
        NoticeLevel::Info => Style::default().fg(Color::Cyan),
        NoticeLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    Span::styled(notice.text.clone(), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::{buffer_text, sample_snapshot};

    fn render_text(state: &ViewState) -> String {
        let backend = ratatui::backend::TestBackend::new(100, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn clock_indicator_colors() {
        assert_eq!(clock_indicator(true).1, Color::Green);
        assert_eq!(clock_indicator(false).1, Color::Yellow);
    }

    #[test]
    fn shows_period_and_dedup_state() {
        let mut snapshot = sample_snapshot();
        snapshot.game.settings.anti_duplicate = true;
        let state = ViewState {
            snapshot: Some(snapshot),
            notice: Some(Notice::error("player required for side B")),
            ..ViewState::default()
        };
        let text = render_text(&state);
        assert!(text.contains("Period 1/4"));
        assert!(text.contains("Dedup ON (90ms)"));
        assert!(text.contains("10 min periods"));
        assert!(text.contains("player required for side B"));
    }

    #[test]
    fn connecting_before_first_snapshot() {
        assert!(render_text(&ViewState::default()).contains("Connecting..."));
    }
}
