//! The reanswer control.

use crate::Message;

/// Messages dropped by a reanswer: the latest question and the answer before it
pub const REANSWER_TRUNCATE: usize = 2;

/// What pressing "reanswer" should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReanswerAction {
    /// A reply is streaming in; stop it and leave the log alone
    CancelGeneration,
    /// Drop the last `count` messages
    Truncate { count: usize },
}

pub fn reanswer(is_generating: bool, log: &[Message]) -> ReanswerAction {
    if is_generating {
        ReanswerAction::CancelGeneration
    } else {
        ReanswerAction::Truncate {
            count: REANSWER_TRUNCATE.min(log.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_of(len: usize) -> Vec<Message> {
        (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("answer {}", i))
                } else {
                    Message::assistant(format!("question {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_truncates_two() {
        assert_eq!(
            reanswer(false, &log_of(12)),
            ReanswerAction::Truncate { count: 2 }
        );
    }

    #[test]
    fn test_cancel_while_generating() {
        assert_eq!(reanswer(true, &log_of(12)), ReanswerAction::CancelGeneration);
    }

    #[test]
    fn test_never_truncates_past_the_start() {
        assert_eq!(
            reanswer(false, &log_of(1)),
            ReanswerAction::Truncate { count: 1 }
        );
    }
}
