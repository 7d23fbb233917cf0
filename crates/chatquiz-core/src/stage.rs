//! Stage resolution.
//!
//! The questionnaire has no explicit state: the active stage is read off the
//! length of the message log. Every user/assistant exchange adds two
//! messages, so the fixed intake prompts sit at lengths 2, 4, 6 and 8 and the
//! open questions start at 10.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::Role;

/// Which intake prompt a free-text stage is answering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeTextKind {
    /// Name and favourite music; the only stage with song search
    MusicOrName,
    /// Personal posts, one per line
    PersonalPost,
    /// Pick one of the nine images
    ImageChoice,
    /// Pick one of the blobs on the blob tree
    BlobChoice,
}

impl FreeTextKind {
    /// Allowed answer range for stages that expect a number
    pub fn numeric_range(self) -> Option<RangeInclusive<i64>> {
        match self {
            FreeTextKind::ImageChoice => Some(1..=9),
            FreeTextKind::BlobChoice => Some(1..=21),
            FreeTextKind::MusicOrName | FreeTextKind::PersonalPost => None,
        }
    }
}

/// Input mode for the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "kind", rename_all = "snake_case")]
pub enum InputMode {
    /// Nothing to answer yet, or the assistant is replying
    Idle,
    FreeText(FreeTextKind),
    SingleSelect,
    MultiSelect,
}

impl InputMode {
    pub fn is_question(self) -> bool {
        matches!(self, InputMode::SingleSelect | InputMode::MultiSelect)
    }
}

/// Which placeholder text the input box should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    None,
    MusicOrName,
    PersonalPost,
    ImageChoice,
    BlobChoice,
    Question,
}

/// Everything the host needs to render the input area for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageDescriptor {
    pub mode: InputMode,
    pub placeholder: PlaceholderKind,
    pub option_buttons_enabled: bool,
    pub reanswer_enabled: bool,
    pub regenerate_enabled: bool,
    pub stop_enabled: bool,
}

impl StageDescriptor {
    pub fn is_multi_select(&self) -> bool {
        self.mode == InputMode::MultiSelect
    }

    /// Song search runs only while the user is typing the music/name answer
    pub fn search_enabled(&self) -> bool {
        self.mode == InputMode::FreeText(FreeTextKind::MusicOrName)
    }
}

/// Mode for a log length, ignoring generation state
pub fn mode_for_length(log_len: usize) -> InputMode {
    match log_len {
        0 => InputMode::Idle,
        2 => InputMode::FreeText(FreeTextKind::MusicOrName),
        4 => InputMode::FreeText(FreeTextKind::PersonalPost),
        6 => InputMode::FreeText(FreeTextKind::ImageChoice),
        8 => InputMode::FreeText(FreeTextKind::BlobChoice),
        10..=13 => InputMode::SingleSelect,
        14.. => InputMode::MultiSelect,
        _ => InputMode::Idle,
    }
}

/// Whether the question at this log length allows several options at once
pub fn is_multi_select(log_len: usize) -> bool {
    mode_for_length(log_len) == InputMode::MultiSelect
}

/// Reanswer needs a completed pair past the intake stages. The upper bounds
/// (13 here, 14 below) do not line up with the stage table and are kept as is.
fn reanswer_window(log_len: usize) -> bool {
    (log_len > 6 && log_len < 13) || log_len > 14
}

/// Resolve the stage descriptor for the current log position
pub fn resolve(
    log_len: usize,
    last_role: Option<Role>,
    is_generating: bool,
    is_complete: bool,
) -> StageDescriptor {
    let mode = if is_generating {
        InputMode::Idle
    } else {
        mode_for_length(log_len)
    };

    let placeholder = match mode {
        InputMode::Idle => PlaceholderKind::None,
        InputMode::FreeText(FreeTextKind::MusicOrName) => PlaceholderKind::MusicOrName,
        InputMode::FreeText(FreeTextKind::PersonalPost) => PlaceholderKind::PersonalPost,
        InputMode::FreeText(FreeTextKind::ImageChoice) => PlaceholderKind::ImageChoice,
        InputMode::FreeText(FreeTextKind::BlobChoice) => PlaceholderKind::BlobChoice,
        InputMode::SingleSelect | InputMode::MultiSelect => PlaceholderKind::Question,
    };

    StageDescriptor {
        mode,
        placeholder,
        option_buttons_enabled: mode.is_question()
            && last_role == Some(Role::Assistant)
            && !is_generating,
        reanswer_enabled: !is_generating && !is_complete && reanswer_window(log_len),
        regenerate_enabled: !is_generating && log_len > 0,
        stop_enabled: is_generating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ranges() {
        assert_eq!(FreeTextKind::ImageChoice.numeric_range(), Some(1..=9));
        assert_eq!(FreeTextKind::BlobChoice.numeric_range(), Some(1..=21));
        assert_eq!(FreeTextKind::PersonalPost.numeric_range(), None);
    }

    #[test]
    fn test_generating_overrides_everything() {
        let stage = resolve(10, Some(Role::Assistant), true, false);
        assert_eq!(stage.mode, InputMode::Idle);
        assert_eq!(stage.placeholder, PlaceholderKind::None);
        assert!(!stage.option_buttons_enabled);
        assert!(!stage.reanswer_enabled);
        assert!(!stage.regenerate_enabled);
        assert!(stage.stop_enabled);
    }

    #[test]
    fn test_search_only_in_music_stage() {
        assert!(resolve(2, Some(Role::Assistant), false, false).search_enabled());
        assert!(!resolve(4, Some(Role::Assistant), false, false).search_enabled());
        assert!(!resolve(2, Some(Role::Assistant), true, false).search_enabled());
    }
}
