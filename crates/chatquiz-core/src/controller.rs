use tracing::{debug, info, warn};

use crate::reanswer::{self, ReanswerAction};
use crate::{
    last_question, last_role, merge, stage, validate, ChatHost, Letter, QuizError,
    SelectionState, StageDescriptor, ToggleOutcome,
};

/// Result of a submit that passed validation (or was skipped)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The answer was appended and the reply requested
    Sent,
    /// Nothing but whitespace in the input
    Blank,
    /// A reply is still being generated
    Busy,
}

/// Drives one questionnaire against a [`ChatHost`].
///
/// Holds the only piece of mutable core state, the option selection of the
/// current question. The selection belongs to the log length it was made
/// at and is dropped as soon as the log moves.
#[derive(Debug, Default)]
pub struct TurnController {
    selection: SelectionState,
    turn: usize,
}

impl TurnController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn stage<H: ChatHost + ?Sized>(&self, host: &H) -> StageDescriptor {
        let log = host.messages();
        stage::resolve(
            log.len(),
            last_role(log),
            host.is_generating(),
            host.is_complete(),
        )
    }

    /// Reset the selection if the log changed since it was made
    pub fn sync<H: ChatHost + ?Sized>(&mut self, host: &H) {
        let len = host.messages().len();
        if len != self.turn {
            if !self.selection.is_empty() {
                debug!(from = self.turn, to = len, "Log moved, dropping option selection");
            }
            self.selection.clear();
            self.turn = len;
        }
    }

    /// Toggle an option button.
    ///
    /// Returns `Ok(None)` when option buttons are disabled for this turn.
    /// A single-select violation is reported to the host and returned; the
    /// input and selection stay as they were.
    pub fn toggle_option<H: ChatHost + ?Sized>(
        &mut self,
        host: &mut H,
        letter: Letter,
    ) -> Result<Option<ToggleOutcome>, QuizError> {
        self.sync(host);
        let stage = self.stage(host);
        if !stage.option_buttons_enabled {
            debug!(letter = %letter, "Option buttons disabled for this turn");
            return Ok(None);
        }

        let question = last_question(host.messages()).unwrap_or_default();
        let toggled = merge::toggle(
            host.raw_input(),
            question,
            letter,
            &self.selection,
            stage.is_multi_select(),
        );

        match toggled {
            Ok(toggle) => {
                debug!(letter = %letter, outcome = ?toggle.outcome, "Option toggled");
                if toggle.outcome != ToggleOutcome::NoMatchingOption {
                    host.set_raw_input(toggle.input);
                }
                self.selection = toggle.selection;
                Ok(Some(toggle.outcome))
            }
            Err(e) => {
                warn!(letter = %letter, "{}", e);
                host.notify_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Validate and send the current input.
    ///
    /// On a validation error the input is kept, nothing is appended and the
    /// selection survives so the user can fix the answer.
    pub fn submit<H: ChatHost + ?Sized>(&mut self, host: &mut H) -> Result<SubmitOutcome, QuizError> {
        self.sync(host);
        if host.is_generating() {
            return Ok(SubmitOutcome::Busy);
        }

        let value = host.raw_input().to_string();
        if value.trim().is_empty() {
            return Ok(SubmitOutcome::Blank);
        }

        let log_len = host.messages().len();
        if let Err(e) = validate::validate(log_len, &value) {
            warn!(log_len, "Answer rejected: {}", e);
            host.notify_error(&e.to_string());
            return Err(e);
        }

        info!(log_len, chars = value.chars().count(), "Submitting answer");
        host.set_raw_input(String::new());
        host.append_message(value);
        self.selection.clear();
        self.turn = host.messages().len();

        Ok(SubmitOutcome::Sent)
    }

    /// Press the reanswer control.
    ///
    /// While a reply is generating this cancels it. Otherwise, if reanswer is
    /// enabled for this turn, the last question and the answer before it are
    /// dropped. Returns the action taken, if any.
    pub fn reanswer<H: ChatHost + ?Sized>(&mut self, host: &mut H) -> Option<ReanswerAction> {
        let generating = host.is_generating();
        if !generating && !self.stage(host).reanswer_enabled {
            debug!(log_len = host.messages().len(), "Reanswer not available");
            return None;
        }

        let action = reanswer::reanswer(generating, host.messages());
        match action {
            ReanswerAction::CancelGeneration => host.stop_generation(),
            ReanswerAction::Truncate { count } => host.truncate_log(count),
        }
        info!(?action, log_len = host.messages().len(), "Reanswer");
        self.sync(host);
        Some(action)
    }

    /// Re-request the assistant reply for the last turn
    pub fn regenerate<H: ChatHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.stage(host).regenerate_enabled {
            return false;
        }
        host.regenerate_last_turn();
        self.sync(host);
        true
    }

    /// Stop the reply currently being generated
    pub fn stop<H: ChatHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.stage(host).stop_enabled {
            return false;
        }
        host.stop_generation();
        true
    }

    /// Throw the conversation away and start over
    pub fn new_chat<H: ChatHost + ?Sized>(&mut self, host: &mut H) {
        if host.is_generating() {
            host.stop_generation();
        }
        host.replace_messages(Vec::new());
        host.set_raw_input(String::new());
        self.selection.clear();
        self.turn = 0;
        info!("Started a new chat");
    }
}
