//! Song search results.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::search::SearchResult;

pub struct ResultsWidget<'a> {
    results: &'a [SearchResult],
    highlighted: Option<usize>,
    title: &'a str,
}

impl<'a> ResultsWidget<'a> {
    pub fn new(results: &'a [SearchResult], highlighted: Option<usize>) -> Self {
        Self {
            results,
            highlighted,
            title: "",
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }
}

impl Widget for ResultsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(format!(" {} (↑↓, Tab) ", self.title));
        let visible = block.inner(area).height as usize;

        // Scroll so the highlighted row stays in view
        let first = match self.highlighted {
            Some(i) if i >= visible => i + 1 - visible,
            _ => 0,
        };

        let lines: Vec<Line> = self
            .results
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .map(|(i, result)| {
                if Some(i) == self.highlighted {
                    Line::from(vec![
                        Span::styled("▶ ", Style::default().fg(Color::Magenta)),
                        Span::styled(
                            result.name.as_str(),
                            Style::default()
                                .fg(Color::Magenta)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ])
                } else {
                    Line::from(vec![Span::raw("  "), Span::raw(result.name.as_str())])
                }
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
