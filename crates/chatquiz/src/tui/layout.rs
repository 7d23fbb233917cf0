//! Layout calculations for the TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Most search results shown at once
pub const MAX_VISIBLE_RESULTS: u16 = 5;

/// Tallest the input box grows (including borders)
const MAX_INPUT_HEIGHT: u16 = 8;

/// Main layout areas, top to bottom
pub struct MainLayout {
    pub header: Rect,
    pub transcript: Rect,
    pub options: Rect,
    pub results: Rect,
    pub input: Rect,
    pub notice: Rect,
    pub footer: Rect,
}

impl MainLayout {
    /// Calculate the layout for a frame.
    ///
    /// `input_lines` is the number of text lines in the input box and
    /// `result_count` the number of search results to list.
    pub fn new(area: Rect, input_lines: u16, result_count: usize) -> Self {
        let input_height = input_lines.max(1).saturating_add(2).min(MAX_INPUT_HEIGHT);
        let results_height = if result_count == 0 {
            0
        } else {
            u16::try_from(result_count)
                .unwrap_or(u16::MAX)
                .min(MAX_VISIBLE_RESULTS)
                + 2
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),              // Header
                Constraint::Min(5),                 // Transcript
                Constraint::Length(3),              // Option buttons
                Constraint::Length(results_height), // Search results
                Constraint::Length(input_height),   // Input
                Constraint::Length(1),              // Notice
                Constraint::Length(1),              // Footer
            ])
            .split(area);

        Self {
            header: chunks[0],
            transcript: chunks[1],
            options: chunks[2],
            results: chunks[3],
            input: chunks[4],
            notice: chunks[5],
            footer: chunks[6],
        }
    }
}
