// Scoreboard widget: team names, scores, fouls, period and clock.
//
// +--------------+---------+--------------+
// | HOME name    | Q1 / 4  |    AWAY name |
// |     12       |  09:30  |      8       |
// | Fouls 3/5    | RUNNING |  Fouls 5/5 B |
// +--------------+---------+--------------+

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use courtside_core::game::{MatchSnapshot, Side};

use crate::tui::ViewState;

/// Render the scoreboard into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = state.snapshot.as_ref() else {
        let paragraph = Paragraph::new("Waiting for match state...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Scoreboard"));
        frame.render_widget(paragraph, area);
        return;
    };
    let game = &snapshot.game;

    let columns = Layout::horizontal([
        Constraint::Percentage(38),
        Constraint::Percentage(24),
        Constraint::Percentage(38),
    ])
    .split(area);

    render_side(frame, columns[0], game, Side::Home, state.selected_side == Side::Home);
    render_center(frame, columns[1], game);
    render_side(frame, columns[2], game, Side::Away, state.selected_side == Side::Away);
}

fn render_side(frame: &mut Frame, area: Rect, game: &MatchSnapshot, side: Side, selected: bool) {
    let slot = game.scoreboard.slot(side);
    let in_bonus = match side {
        Side::Home => game.home_in_bonus,
        Side::Away => game.away_in_bonus,
    };

    let border = if selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let title = if selected {
        format!(" {} < ", side.label())
    } else {
        format!(" {} ", side.label())
    };

    let mut foul_spans = vec![Span::raw(foul_text(slot.fouls, game.scoreboard.foul_limit))];
    if in_bonus {
        foul_spans.push(Span::styled(
            "  BONUS",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(
            slot.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            slot.score.to_string(),
            Style::default()
                .fg(score_color(game, side))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(foul_spans),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        );
    frame.render_widget(paragraph, area);
}

fn render_center(frame: &mut Frame, area: Rect, game: &MatchSnapshot) {
    let clock = &game.scoreboard.clock;
    let (state_label, state_color) = if clock.running {
        ("RUNNING", Color::Green)
    } else if clock.is_expired() {
        ("END", Color::Red)
    } else {
        ("STOPPED", Color::Yellow)
    };

    let lines = vec![
        Line::from(period_label(game.scoreboard.period, game.settings.periods_total)),
        Line::from(Span::styled(
            game.clock_display.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(state_label, Style::default().fg(state_color))),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Clock "));
    frame.render_widget(paragraph, area);
}

/// Period indicator, e.g. `Q2 / 4`.
pub fn period_label(period: u32, periods_total: u32) -> String {
    format!("Q{period} / {periods_total}")
}

/// Foul counter text, e.g. `Fouls 3/5`.
pub fn foul_text(fouls: u32, limit: u32) -> String {
    format!("Fouls {fouls}/{limit}")
}

/// Leader in green, trailer in default color, both white when tied.
fn score_color(game: &MatchSnapshot, side: Side) -> Color {
    match game.scoreboard.leader() {
        Some(leader) if leader == side => Color::Green,
        Some(_) => Color::Gray,
        None => Color::White,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
