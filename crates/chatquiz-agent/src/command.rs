//! Backend that delegates each reply to an external program.
//!
//! The program receives the conversation as a JSON array of
//! `{"role", "content"}` objects on stdin and prints its reply on stdout,
//! either as a `{"content", "is_final"}` object or as plain text.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

use chatquiz_core::Message;

use crate::{Backend, BackendConfig, BackendError, BackendType, ProcessSpawner, Reply};

pub struct CommandBackend {
    program: PathBuf,
    args: Vec<String>,
    config: BackendConfig,
}

impl CommandBackend {
    pub fn new(program: PathBuf, config: BackendConfig) -> Self {
        Self {
            program,
            args: Vec::new(),
            config,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Backend for CommandBackend {
    fn name(&self) -> &str {
        "External command"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Command
    }

    async fn respond(&self, history: &[Message]) -> Result<Reply, BackendError> {
        let request = serde_json::to_string(history)
            .map_err(|e| BackendError::ExecutionFailed(format!("Failed to encode history: {}", e)))?;

        let output = ProcessSpawner::spawn(&self.program, &self.args, &request, &self.config).await?;

        if !output.success() {
            warn!(
                exit_code = output.exit_code,
                stderr = %output.stderr,
                "Backend command failed"
            );
            let detail = if output.stderr.trim().is_empty() {
                format!("exit code {}", output.exit_code)
            } else {
                output.stderr.trim().to_string()
            };
            return Err(BackendError::ExecutionFailed(detail));
        }

        let reply = parse_reply(&output.stdout);
        if reply.content.is_empty() {
            return Err(BackendError::ExecutionFailed(
                "Backend command produced no reply".to_string(),
            ));
        }
        debug!(
            reply_len = reply.content.len(),
            is_final = reply.is_final,
            "Command reply"
        );
        Ok(reply)
    }

    async fn is_available(&self) -> bool {
        if self.program.components().count() > 1 {
            return self.program.exists();
        }
        Command::new("which")
            .arg(&self.program)
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Read a reply from program output.
///
/// Whole-output JSON wins; otherwise the output is taken as plain text.
pub fn parse_reply(output: &str) -> Reply {
    let trimmed = output.trim();
    if trimmed.starts_with('{') {
        if let Ok(reply) = serde_json::from_str::<Reply>(trimmed) {
            return reply;
        }
    }
    Reply::text(trimmed)
}
