// TUI widget modules for each scoreboard panel and overlay.

pub mod help_bar;
pub mod history;
pub mod player_picker;
pub mod quit_confirm;
pub mod roster_editor;
pub mod sanctions;
pub mod scoreboard;
pub mod stats;
pub mod status_bar;
pub mod team_picker;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Compute a centered rectangle of the given size within `area`.
///
/// If the area is too small, the rectangle is clamped to the available space.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}
