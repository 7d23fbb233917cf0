//! Terminal chat host built on ratatui and crossterm.

mod app;
mod input;
mod layout;
mod state;
mod widgets;

pub use app::{App, SearchPane};
pub use input::InputBuffer;
pub use state::{ChatState, ReplyEvent, ReplyOutcome};
