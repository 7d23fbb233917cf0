//! Answer input box.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::tui::input::InputBuffer;

/// Multi-line input with cursor and per-stage placeholder
pub struct InputWidget<'a> {
    buffer: &'a InputBuffer,
    placeholder: &'a str,
    title: &'a str,
    enabled: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(buffer: &'a InputBuffer) -> Self {
        Self {
            buffer,
            placeholder: "",
            title: "",
            enabled: true,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Disabled while a reply is generating
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        if self.buffer.is_empty() {
            let mut spans = vec![];
            if self.enabled {
                spans.push(Span::styled(" ", Style::default().bg(Color::White)));
            }
            spans.push(Span::styled(
                self.placeholder,
                Style::default().fg(Color::DarkGray),
            ));
            return vec![Line::from(spans)];
        }

        if !self.enabled {
            return self
                .buffer
                .text()
                .split('\n')
                .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::DarkGray))))
                .collect();
        }

        let (before, after) = self.buffer.split_at_cursor();
        let cursor_style = Style::default().bg(Color::White).fg(Color::Black);

        // Lines before the cursor line pass through untouched
        let mut lines: Vec<Line<'a>> = vec![];
        let mut before_lines: Vec<&'a str> = before.split('\n').collect();
        let head = before_lines.pop().unwrap_or_default();
        lines.extend(before_lines.into_iter().map(Line::from));

        let mut after_lines = after.split('\n');
        let tail = after_lines.next().unwrap_or_default();

        let mut cursor_line = vec![Span::raw(head)];
        match tail.chars().next() {
            Some(c) => {
                let (under, rest) = tail.split_at(c.len_utf8());
                cursor_line.push(Span::styled(under, cursor_style));
                cursor_line.push(Span::raw(rest));
            }
            None => cursor_line.push(Span::styled(" ", cursor_style)),
        }
        lines.push(Line::from(cursor_line));
        lines.extend(after_lines.map(Line::from));
        lines
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = if self.enabled {
            Color::Green
        } else {
            Color::DarkGray
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(format!(" {} ", self.title));

        let inner = block.inner(area);
        let lines = self.lines();

        // Keep the cursor line visible when the text outgrows the box
        let cursor_row = self.buffer.split_at_cursor().0.matches('\n').count() as u16;
        let offset = cursor_row.saturating_sub(inner.height.saturating_sub(1));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((offset, 0))
            .render(area, buf);
    }
}
