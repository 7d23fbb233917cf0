use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use chatquiz_core::Message;

/// Errors that can occur while producing a reply
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to spawn backend process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Backend timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Backend execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid questionnaire script: {0}")]
    Script(String),
}

/// An assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub content: String,
    /// The questionnaire is over after this reply
    #[serde(default)]
    pub is_final: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_final: false,
        }
    }

    pub fn last(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_final: true,
        }
    }
}

/// Configuration for process-based backends
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Working directory for spawned processes
    pub working_dir: PathBuf,
    /// Optional timeout (None = no limit)
    pub timeout: Option<std::time::Duration>,
    /// Additional environment variables
    pub env_vars: HashMap<String, String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: None,
            env_vars: HashMap::new(),
        }
    }
}

impl BackendConfig {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_env(mut self, key: String, value: String) -> Self {
        self.env_vars.insert(key, value);
        self
    }
}

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    Scripted,
    Command,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Scripted => write!(f, "scripted"),
            BackendType::Command => write!(f, "command"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scripted" | "script" => Ok(BackendType::Scripted),
            "command" | "cmd" => Ok(BackendType::Command),
            _ => Err(format!("Unknown backend type: {}", s)),
        }
    }
}

/// Produces the assistant side of the questionnaire
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable name of the backend
    fn name(&self) -> &str;

    fn backend_type(&self) -> BackendType;

    /// Produce the reply to the conversation so far. The last message is
    /// normally the user's latest answer.
    async fn respond(&self, history: &[Message]) -> Result<Reply, BackendError>;

    /// Check if the backend can be used on this system
    async fn is_available(&self) -> bool;
}
