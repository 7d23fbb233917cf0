//! Answer validation for the numeric intake stages.

use crate::stage::{mode_for_length, InputMode};
use crate::QuizError;

/// Check a raw answer against the stage at `log_len`.
///
/// Only the image-choice (length 6) and blob-choice (length 8) stages have
/// rules; every other stage accepts any text.
pub fn validate(log_len: usize, raw_value: &str) -> Result<(), QuizError> {
    let InputMode::FreeText(kind) = mode_for_length(log_len) else {
        return Ok(());
    };
    let Some(range) = kind.numeric_range() else {
        return Ok(());
    };

    match raw_value.trim().parse::<i64>() {
        Ok(n) if range.contains(&n) => Ok(()),
        _ => Err(QuizError::RangeViolation {
            expected: format!("{}-{}", range.start(), range.end()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_choice_bounds() {
        assert!(validate(6, "1").is_ok());
        assert!(validate(6, "9").is_ok());
        assert!(validate(6, " 5\n").is_ok());
        assert_eq!(
            validate(6, "0"),
            Err(QuizError::RangeViolation {
                expected: "1-9".to_string()
            })
        );
        assert!(validate(6, "five").is_err());
        assert!(validate(6, "").is_err());
        assert!(validate(6, "4.5").is_err());
    }

    #[test]
    fn test_blob_choice_bounds() {
        let out_of_range = Err(QuizError::RangeViolation {
            expected: "1-21".to_string(),
        });
        assert!(validate(8, "1").is_ok());
        assert!(validate(8, "21").is_ok());
        assert_eq!(validate(8, "0"), out_of_range);
        assert_eq!(validate(8, "22"), out_of_range);
        assert_eq!(validate(8, "blob"), out_of_range);
        assert_eq!(validate(8, ""), out_of_range);
    }

    #[test]
    fn test_free_text_stages_accept_anything() {
        assert!(validate(2, "").is_ok());
        assert!(validate(4, "post one\npost two").is_ok());
        assert!(validate(10, "(A) cat").is_ok());
        assert!(validate(7, "abc").is_ok());
    }
}
