// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Scoreboard (7 rows)                               |
// +-------------------------+------------------------+
// | Scoring History (55%)    | Sanctions / Stats (45%)|
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Height of the scoreboard zone, borders included.
pub const SCOREBOARD_HEIGHT: u16 = 7;

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: period, clock state, anti-duplicate flag, notices.
    pub status_bar: Rect,
    /// Team names, scores, clock and foul counts.
    pub scoreboard: Rect,
    /// Left side of the middle section: scoring history.
    pub history: Rect,
    /// Right side of the middle section: sanction log or statistics.
    pub side_panel: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | scoreboard(7) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(SCOREBOARD_HEIGHT),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(vertical[2]);

    AppLayout {
        status_bar: vertical[0],
        scoreboard: vertical[1],
        history: horizontal[0],
        side_panel: horizontal[1],
        help_bar: vertical[3],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        let rects = [
            ("status_bar", layout.status_bar),
            ("scoreboard", layout.scoreboard),
            ("history", layout.history),
            ("side_panel", layout.side_panel),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in rects {
            assert!(rect.width > 0, "{name} has zero width");
            assert!(rect.height > 0, "{name} has zero height");
        }
    }

    #[test]
    fn fixed_heights() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.scoreboard.height, SCOREBOARD_HEIGHT);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.history.height, 40 - 1 - SCOREBOARD_HEIGHT - 1);
    }

    #[test]
    fn middle_panels_share_the_row() {
        let layout = build_layout(test_area());
        assert_eq!(layout.history.y, layout.side_panel.y);
        assert_eq!(layout.history.width + layout.side_panel.width, 120);
        assert!(layout.history.width > layout.side_panel.width);
    }

    #[test]
    fn layout_fits_within_area() {
        let area = test_area();
        let layout = build_layout(area);
        for rect in [
            layout.status_bar,
            layout.scoreboard,
            layout.history,
            layout.side_panel,
            layout.help_bar,
        ] {
            assert!(rect.right() <= area.right());
            assert!(rect.bottom() <= area.bottom());
        }
    }

    #[test]
    fn small_terminal_does_not_panic() {
        let area = Rect::new(0, 0, 20, 8);
        let layout = build_layout(area);
        assert!(layout.help_bar.bottom() <= area.bottom());
    }
}
