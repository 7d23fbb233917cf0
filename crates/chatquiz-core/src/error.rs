use thiserror::Error;

use crate::Letter;

/// Recoverable user-facing errors. None of these are fatal; the caller shows
/// the message as a notice and leaves its state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("Only one option can be chosen for this question (deselect it before choosing ({letter}))")]
    SingleSelectViolation { letter: Letter },

    #[error("Please answer with a number in the range {expected}")]
    RangeViolation { expected: String },
}
