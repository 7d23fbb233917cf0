//! Option merging.
//!
//! Option buttons do not send anything by themselves: toggling a letter
//! copies the matching `(X) ...` line of the question into the free-text
//! answer, and toggling it again takes the line back out. The answer stays
//! ordinary text the user can keep editing.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::selection::Joint;
use crate::{Letter, QuizError, SelectionState};

lazy_static! {
    /// `(?m)^\(X\).*$` for each letter, in `Letter::ALL` order
    static ref OPTION_LINES: [Regex; 4] = Letter::ALL.map(|letter| {
        Regex::new(&format!(r"(?m)^{}.*$", regex::escape(letter.marker())))
            .expect("option line pattern is valid")
    });
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The option line was appended to the input
    Selected,
    /// The option line was removed from the input
    Deselected,
    /// The question has no line for this letter; nothing changed
    NoMatchingOption,
}

/// Result of a toggle: the next input text and selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub input: String,
    pub selection: SelectionState,
    pub outcome: ToggleOutcome,
}

/// The full option line for `letter` in the question text, if it offers one
pub fn option_line(question: &str, letter: Letter) -> Option<&str> {
    OPTION_LINES[letter.index()]
        .find(question)
        .map(|m| m.as_str())
}

/// Toggle `letter` in or out of the answer text.
///
/// Returns [`QuizError::SingleSelectViolation`] when the question is
/// single-select and another letter is already chosen; the caller keeps its
/// current input and selection in that case.
pub fn toggle(
    current_input: &str,
    question: &str,
    letter: Letter,
    selection: &SelectionState,
    multi_select: bool,
) -> Result<Toggle, QuizError> {
    if !multi_select && selection.any_other_selected(letter) {
        return Err(QuizError::SingleSelectViolation { letter });
    }

    if let Some(joint) = selection.joint(letter) {
        let mut next = selection.clone();
        next.unmark(letter);
        let (input, collapsed_at) = remove_option_line(current_input, letter, joint);
        if let Some(at) = collapsed_at {
            rejoin_following(&input, at, &mut next);
        }
        return Ok(Toggle {
            input,
            selection: next,
            outcome: ToggleOutcome::Deselected,
        });
    }

    let Some(line) = option_line(question, letter) else {
        debug!(letter = %letter, "Question offers no such option");
        return Ok(Toggle {
            input: current_input.to_string(),
            selection: selection.clone(),
            outcome: ToggleOutcome::NoMatchingOption,
        });
    };

    let (input, joint) = append_line(current_input, line);
    let mut next = selection.clone();
    next.mark(letter, joint);

    Ok(Toggle {
        input,
        selection: next,
        outcome: ToggleOutcome::Selected,
    })
}

fn append_line(input: &str, line: &str) -> (String, Joint) {
    if input.is_empty() || input.ends_with('\n') {
        (format!("{}{}", input, line), Joint::Bare)
    } else {
        (format!("{}\n{}", input, line), Joint::Newline)
    }
}

/// Remove the last line starting with the letter's marker.
///
/// A line that was joined with an inserted newline takes that newline with
/// it. Otherwise the blank line left behind at the deletion site (a leading
/// newline, or a doubled one) is collapsed once, and the offset of the
/// collapse is returned.
fn remove_option_line(input: &str, letter: Letter, joint: Joint) -> (String, Option<usize>) {
    let Some(found) = OPTION_LINES[letter.index()].find_iter(input).last() else {
        // The user already deleted it by hand.
        return (input.to_string(), None);
    };
    let (start, end) = (found.start(), found.end());

    // A multiline `^` match past offset 0 always follows a '\n'.
    if joint == Joint::Newline && start > 0 {
        return (format!("{}{}", &input[..start - 1], &input[end..]), None);
    }

    let mut out = String::with_capacity(input.len());
    out.push_str(&input[..start]);
    out.push_str(&input[end..]);

    if out[start..].starts_with('\n') && (start == 0 || out[..start].ends_with('\n')) {
        out.remove(start);
        return (out, Some(start));
    }
    (out, None)
}

/// After a bare line is removed, the line that moved up into its place no
/// longer owns the newline in front of it. If that line is a selected option
/// joined with an inserted newline, it is now bare.
fn rejoin_following(input: &str, at: usize, selection: &mut SelectionState) {
    for letter in Letter::ALL {
        if selection.joint(letter) != Some(Joint::Newline) {
            continue;
        }
        let starts_here = OPTION_LINES[letter.index()]
            .find_iter(input)
            .last()
            .is_some_and(|m| m.start() == at);
        if starts_here {
            selection.mark(letter, Joint::Bare);
        }
    }
}
