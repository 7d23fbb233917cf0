//! Conversation transcript.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use chatquiz_core::{Message, Role};

/// Scrollable list of messages, pinned to the bottom unless scrolled up
pub struct TranscriptWidget<'a> {
    messages: &'a [Message],
    you: &'a str,
    assistant: &'a str,
    title: &'a str,
    /// Lines scrolled up from the bottom
    scroll: u16,
    pending: Option<&'a str>,
    empty_hint: &'a str,
}

impl<'a> TranscriptWidget<'a> {
    pub fn new(messages: &'a [Message], you: &'a str, assistant: &'a str) -> Self {
        Self {
            messages,
            you,
            assistant,
            title: "",
            scroll: 0,
            pending: None,
            empty_hint: "",
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show a trailing "generating" line
    pub fn pending(mut self, text: Option<&'a str>) -> Self {
        self.pending = text;
        self
    }

    pub fn empty_hint(mut self, hint: &'a str) -> Self {
        self.empty_hint = hint;
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let mut lines = vec![];

        if self.messages.is_empty() && self.pending.is_none() {
            lines.push(Line::from(Span::styled(
                self.empty_hint,
                Style::default().fg(Color::DarkGray),
            )));
            return lines;
        }

        for message in self.messages {
            let (label, color) = match message.role {
                Role::User => (self.you, Color::Green),
                Role::Assistant => (self.assistant, Color::Cyan),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for text in message.content.lines() {
                let style = if text.starts_with('(') && message.role == Role::Assistant {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(text, style)));
            }
            lines.push(Line::from(""));
        }

        if let Some(pending) = self.pending {
            lines.push(Line::from(Span::styled(
                pending,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        lines
    }
}

/// Rows a set of lines takes once wrapped at `width`
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

impl Widget for TranscriptWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(format!(" {} ", self.title));

        let inner = block.inner(area);
        let lines = self.lines();
        let total = wrapped_height(&lines, inner.width);
        let bottom = total.saturating_sub(inner.height);
        let offset = bottom.saturating_sub(self.scroll);

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((offset, 0))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("abcdefghij"), Line::from(""), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 80), 3);
    }

    #[test]
    fn test_renders_latest_message_at_bottom() {
        let messages: Vec<Message> = (0..10)
            .map(|i| Message::assistant(format!("line {}", i)))
            .collect();
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        TranscriptWidget::new(&messages, "You", "Bot").render(area, &mut buf);

        let rows: Vec<String> = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect();
        assert!(rows.iter().any(|r| r.contains("line 9")));
        assert!(!rows.iter().any(|r| r.contains("line 0")));
    }
}
