use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured events for one questionnaire session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QuizEvent {
    SessionStarted {
        session_id: String,
        backend: String,
        lang: String,
    },
    StageEntered {
        log_len: usize,
        mode: String,
    },
    OptionToggled {
        letter: char,
        selected: bool,
    },
    AnswerRejected {
        log_len: usize,
        reason: String,
    },
    AnswerSubmitted {
        log_len: usize,
        chars: usize,
    },
    Reanswered {
        removed: usize,
    },
    Regenerated {
        log_len: usize,
    },
    GenerationStopped {
        log_len: usize,
    },
    ReplyReceived {
        log_len: usize,
        is_final: bool,
        duration_ms: u64,
    },
    BackendFailed {
        error: String,
    },
    ChatReset {
        discarded: usize,
    },
    SessionCompleted {
        messages: usize,
        duration_secs: f64,
    },
}

impl QuizEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }

    /// Single-line summary, e.g. `answer:submit len=10 chars=7`
    pub fn compact(&self) -> String {
        match self {
            QuizEvent::SessionStarted {
                session_id,
                backend,
                lang,
            } => format!("session:start {} backend={} lang={}", session_id, backend, lang),
            QuizEvent::StageEntered { log_len, mode } => {
                format!("stage:enter len={} mode={}", log_len, mode)
            }
            QuizEvent::OptionToggled { letter, selected } => {
                let action = if *selected { "on" } else { "off" };
                format!("option:{} {}", action, letter)
            }
            QuizEvent::AnswerRejected { log_len, reason } => {
                format!("answer:reject len={} {}", log_len, reason)
            }
            QuizEvent::AnswerSubmitted { log_len, chars } => {
                format!("answer:submit len={} chars={}", log_len, chars)
            }
            QuizEvent::Reanswered { removed } => format!("reanswer removed={}", removed),
            QuizEvent::Regenerated { log_len } => format!("regenerate len={}", log_len),
            QuizEvent::GenerationStopped { log_len } => format!("stop len={}", log_len),
            QuizEvent::ReplyReceived {
                log_len,
                is_final,
                duration_ms,
            } => format!(
                "reply len={} final={} {}ms",
                log_len, is_final, duration_ms
            ),
            QuizEvent::BackendFailed { error } => format!("backend:error {}", error),
            QuizEvent::ChatReset { discarded } => format!("chat:new discarded={}", discarded),
            QuizEvent::SessionCompleted {
                messages,
                duration_secs,
            } => format!("session:done messages={} {:.1}s", messages, duration_secs),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field lines
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

/// Logger for questionnaire events: a tracing line per event plus an
/// optional JSONL events file
pub struct Logger {
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new() -> Self {
        Self { file_writer: None }
    }

    /// Create a logger that also appends every event to `log_path`
    pub fn with_file(log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &QuizEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match event {
            QuizEvent::BackendFailed { .. } | QuizEvent::AnswerRejected { .. } => {
                tracing::warn!(target: "chatquiz::events", "{}", event.compact());
            }
            _ => tracing::info!(target: "chatquiz::events", "{}", event.compact()),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
