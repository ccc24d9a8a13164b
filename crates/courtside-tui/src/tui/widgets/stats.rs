// Statistics panel: lead changes, largest lead, current run and
// points per period.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use ratatui::Frame;

use courtside_core::game::{MatchSnapshot, Side};

use crate::tui::ViewState;

/// Render the statistics panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Statistics");
    let Some(snapshot) = state.snapshot.as_ref() else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };
    let game = &snapshot.game;

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [summary_area, table_area] =
        Layout::vertical([Constraint::Length(4), Constraint::Min(0)]).areas(inner);

    let summary = vec![
        Line::from(format!("Lead changes: {}", game.stats.lead_changes)),
        Line::from(format!("Largest lead: {}", largest_lead_text(game))),
        Line::from(format!("Current run:  {}", run_text(game))),
    ];
    frame.render_widget(Paragraph::new(summary), summary_area);

    let header = Row::new(vec![
        "Period".to_string(),
        game.scoreboard.home.name.clone(),
        game.scoreboard.away.name.clone(),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = game
        .stats
        .per_period
        .iter()
        .map(|(period, tally)| {
            Row::new(vec![
                format!("Q{period}"),
                tally.home.to_string(),
                tally.away.to_string(),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Percentage(45),
            Constraint::Percentage(45),
        ],
    )
    .header(header)
    .style(Style::default().fg(Color::White));
    frame.render_widget(table, table_area);
}

fn side_name(game: &MatchSnapshot, side: Side) -> &str {
    &game.scoreboard.slot(side).name
}

/// Largest margin with the side that held it, e.g. `7 (Leones)`.
pub fn largest_lead_text(game: &MatchSnapshot) -> String {
    match game.stats.largest_lead_side {
        Some(side) => format!("{} ({})", game.stats.largest_lead, side_name(game, side)),
        None => "-".to_string(),
    }
}

/// Active scoring run, e.g. `8-0 Aguilas`. A run made only of corrections
/// shows as `-`.
pub fn run_text(game: &MatchSnapshot) -> String {
    match game.stats.active_run {
        Some(run) if run.points > 0 => format!("{}-0 {}", run.points, side_name(game, run.side)),
        _ => "-".to_string(),
    }
}
