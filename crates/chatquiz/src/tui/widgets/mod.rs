//! TUI widgets for the questionnaire.

mod input;
mod options;
mod results;
mod transcript;

pub use input::InputWidget;
pub use options::OptionButtons;
pub use results::ResultsWidget;
pub use transcript::TranscriptWidget;
