use chatquiz_core::stage::{is_multi_select, mode_for_length, resolve};
use chatquiz_core::{FreeTextKind, InputMode, PlaceholderKind, Role};

// ============================================================
// Stage table
// ============================================================

#[test]
fn test_every_tabled_length() {
    let expected = [
        (0, InputMode::Idle),
        (2, InputMode::FreeText(FreeTextKind::MusicOrName)),
        (4, InputMode::FreeText(FreeTextKind::PersonalPost)),
        (6, InputMode::FreeText(FreeTextKind::ImageChoice)),
        (8, InputMode::FreeText(FreeTextKind::BlobChoice)),
        (10, InputMode::SingleSelect),
        (11, InputMode::SingleSelect),
        (12, InputMode::SingleSelect),
        (13, InputMode::SingleSelect),
        (14, InputMode::MultiSelect),
        (15, InputMode::MultiSelect),
        (40, InputMode::MultiSelect),
    ];

    for (len, mode) in expected {
        assert_eq!(mode_for_length(len), mode, "log length {}", len);
        assert_eq!(
            resolve(len, Some(Role::Assistant), false, false).mode,
            mode,
            "log length {}",
            len
        );
    }
}

#[test]
fn test_lengths_outside_buckets_are_idle() {
    for len in [1, 3, 5, 7, 9] {
        let stage = resolve(len, Some(Role::User), false, false);
        assert_eq!(stage.mode, InputMode::Idle, "log length {}", len);
        assert_eq!(stage.placeholder, PlaceholderKind::None);
        assert!(!stage.option_buttons_enabled);
    }
}

#[test]
fn test_placeholders_follow_mode() {
    let cases = [
        (2, PlaceholderKind::MusicOrName),
        (4, PlaceholderKind::PersonalPost),
        (6, PlaceholderKind::ImageChoice),
        (8, PlaceholderKind::BlobChoice),
        (10, PlaceholderKind::Question),
        (16, PlaceholderKind::Question),
    ];
    for (len, placeholder) in cases {
        assert_eq!(
            resolve(len, Some(Role::Assistant), false, false).placeholder,
            placeholder
        );
    }
}

#[test]
fn test_multi_select_threshold() {
    assert!(!is_multi_select(13));
    assert!(is_multi_select(14));
}

// ============================================================
// Scenarios
// ============================================================

#[test]
fn test_empty_log_is_idle() {
    let stage = resolve(0, None, false, false);
    assert_eq!(stage.mode, InputMode::Idle);
    assert!(!stage.option_buttons_enabled);
    assert!(!stage.reanswer_enabled);
    assert!(!stage.regenerate_enabled);
    assert!(!stage.stop_enabled);
}

#[test]
fn test_first_question_enables_buttons() {
    let stage = resolve(10, Some(Role::Assistant), false, false);
    assert_eq!(stage.mode, InputMode::SingleSelect);
    assert!(stage.option_buttons_enabled);
    assert!(!stage.is_multi_select());
}

#[test]
fn test_awaiting_reply_disables_buttons() {
    let stage = resolve(15, Some(Role::User), false, false);
    assert_eq!(stage.mode, InputMode::MultiSelect);
    assert!(!stage.option_buttons_enabled);
}

#[test]
fn test_buttons_need_a_question_stage() {
    assert!(!resolve(8, Some(Role::Assistant), false, false).option_buttons_enabled);
    assert!(!resolve(2, Some(Role::Assistant), false, false).option_buttons_enabled);
}

// ============================================================
// Reanswer availability
// ============================================================

#[test]
fn test_reanswer_window() {
    let enabled: Vec<usize> = (0..20)
        .filter(|len| resolve(*len, Some(Role::Assistant), false, false).reanswer_enabled)
        .collect();
    assert_eq!(enabled, vec![7, 8, 9, 10, 11, 12, 15, 16, 17, 18, 19]);
}

#[test]
fn test_reanswer_disabled_when_complete_or_generating() {
    assert!(!resolve(16, Some(Role::Assistant), false, true).reanswer_enabled);
    assert!(!resolve(16, Some(Role::Assistant), true, false).reanswer_enabled);
}

#[test]
fn test_regenerate_and_stop() {
    let idle = resolve(3, Some(Role::User), false, false);
    assert!(idle.regenerate_enabled);
    assert!(!idle.stop_enabled);

    let busy = resolve(3, Some(Role::User), true, false);
    assert!(!busy.regenerate_enabled);
    assert!(busy.stop_enabled);
}
