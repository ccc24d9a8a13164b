// Help bar widget: key hints for the current input mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{InputMode, ViewState};

/// Render the help bar into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Key hints for the active mode.
pub fn help_text(state: &ViewState) -> &'static str {
    if state.confirm_quit {
        return " y:Quit | n/Esc:Cancel";
    }
    match state.mode {
        InputMode::Normal => {
            " h/a:Side | 1-3:Score | -:Correct | p/t/u:Foul | Space:Clock | n:Next | f:Fouls | [/]:Length | d:Dedup | g:Teams | r:Rosters | s:Stats | e:Export | R:Reset | q:Quit"
        }
        InputMode::PlayerPicker { .. } => " j/k:Move | Enter:Confirm | Esc:Cancel",
        InputMode::TeamPicker(_) => " j/k:Move | h:Home | a:Away | x:Clear | Enter:Apply | Esc:Cancel",
        InputMode::RosterEditor(ref edit) if edit.prompt.is_some() => {
            " Type | Backspace:Delete | Enter:Save | Esc:Cancel"
        }
        InputMode::RosterEditor(_) => {
            " j/k:Move | Tab:Teams/Players | n:New team | p:Add player | l:Logo | x:Delete | Esc:Close"
        }
    }
}
