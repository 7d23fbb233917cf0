//! # chatquiz
//!
//! Terminal host for the chatquiz questionnaire: configuration, localized
//! texts, debounced song search and the ratatui chat UI.

pub mod config;
pub mod search;
pub mod texts;
pub mod tui;
