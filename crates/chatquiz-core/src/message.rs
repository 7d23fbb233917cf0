use serde::{Deserialize, Serialize};

/// Who sent a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person taking the questionnaire
    User,
    /// The questionnaire backend
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single entry in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Role of the last message in the log, if any
pub fn last_role(log: &[Message]) -> Option<Role> {
    log.last().map(|m| m.role)
}

/// Text of the most recent assistant message (the question being answered)
pub fn last_question(log: &[Message]) -> Option<&str> {
    log.iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_question_skips_user_messages() {
        let log = vec![
            Message::user("hi"),
            Message::assistant("(A) cat\n(B) dog"),
            Message::user("(A) cat"),
        ];
        assert_eq!(last_question(&log), Some("(A) cat\n(B) dog"));
        assert_eq!(last_role(&log), Some(Role::User));
    }

    #[test]
    fn test_empty_log() {
        assert_eq!(last_question(&[]), None);
        assert_eq!(last_role(&[]), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Message::assistant("q")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"q"}"#);
    }
}
