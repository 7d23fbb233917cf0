//! A-D option buttons.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use chatquiz_core::{Letter, SelectionState};

/// Row of four buttons; selected letters are highlighted, the whole row is
/// dimmed while buttons are disabled
pub struct OptionButtons<'a> {
    selection: &'a SelectionState,
    enabled: bool,
    multi_select: bool,
}

impl<'a> OptionButtons<'a> {
    pub fn new(selection: &'a SelectionState) -> Self {
        Self {
            selection,
            enabled: false,
            multi_select: false,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }
}

impl Widget for OptionButtons<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (i, (letter, cell)) in Letter::ALL.iter().zip(cells.iter()).enumerate() {
            let selected = self.selection.is_selected(*letter);
            let (border, label) = if !self.enabled {
                (
                    Style::default().fg(Color::DarkGray),
                    Style::default().fg(Color::DarkGray),
                )
            } else if selected {
                (
                    Style::default().fg(Color::Green),
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (
                    Style::default().fg(Color::Blue),
                    Style::default().fg(Color::White),
                )
            };

            let mark = match (selected, self.multi_select) {
                (true, true) => "[x]",
                (false, true) => "[ ]",
                (true, false) => "(•)",
                (false, false) => "( )",
            };

            let text = Line::from(vec![
                Span::styled(format!(" {} ", mark), label),
                Span::styled(format!("F{} {}", i + 1, letter), label),
            ]);

            Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).border_style(border))
                .render(*cell, buf);
        }
    }
}
