//! # chatquiz-core
//!
//! The questionnaire state machine behind the chatquiz chat flow.
//!
//! Everything here is a pure function of the message log plus a small
//! per-question [`SelectionState`]:
//!
//! - [`stage::resolve`] maps the log position to a [`StageDescriptor`]
//! - [`merge::toggle`] merges `(A)`..`(D)` option lines into the free-text input
//! - [`validate::validate`] checks numeric answers for the intake stages
//! - [`reanswer::reanswer`] decides how the "reanswer" control acts
//!
//! [`TurnController`] ties these together against a [`ChatHost`], the
//! application that owns the log, the input box and the assistant backend.

mod controller;
mod error;
mod host;
mod message;
mod selection;

pub mod merge;
pub mod reanswer;
pub mod stage;
pub mod validate;

pub use controller::{SubmitOutcome, TurnController};
pub use error::QuizError;
pub use host::ChatHost;
pub use merge::{Toggle, ToggleOutcome};
pub use message::{last_question, last_role, Message, Role};
pub use reanswer::ReanswerAction;
pub use selection::{Letter, SelectionState};
pub use stage::{FreeTextKind, InputMode, PlaceholderKind, StageDescriptor};
