//! A fixed questionnaire read from a TOML script.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use chatquiz_core::{Letter, Message};

use crate::{Backend, BackendError, BackendType, Reply};

/// Number of intake prompts; one per fixed intake stage
pub const INTAKE_PROMPTS: usize = 4;

const DEFAULT_SCRIPT: &str = include_str!("../assets/default_script.toml");

/// The questionnaire content
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Replies to the first four user messages
    pub intake: Vec<String>,
    /// Open questions asked after the intake
    #[serde(default)]
    pub questions: Vec<ScriptedQuestion>,
    /// Final message once every question is answered
    pub closing: String,
}

/// One open question with up to four options
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedQuestion {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl ScriptedQuestion {
    /// Question text with one `(X) option` line per option
    pub fn render(&self) -> String {
        let mut text = self.prompt.clone();
        for (letter, option) in Letter::ALL.iter().zip(&self.options) {
            text.push('\n');
            text.push_str(letter.marker());
            text.push(' ');
            text.push_str(option);
        }
        text
    }
}

impl Script {
    /// The script shipped with the crate
    pub fn builtin() -> Result<Self, BackendError> {
        Self::parse(DEFAULT_SCRIPT)
    }

    pub fn parse(content: &str) -> Result<Self, BackendError> {
        let script: Script =
            toml::from_str(content).map_err(|e| BackendError::Script(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| BackendError::Script(format!("{}: {}", path.display(), e)))
    }

    fn validate(&self) -> Result<(), BackendError> {
        if self.intake.len() != INTAKE_PROMPTS {
            return Err(BackendError::Script(format!(
                "expected {} intake prompts, found {}",
                INTAKE_PROMPTS,
                self.intake.len()
            )));
        }
        for (i, question) in self.questions.iter().enumerate() {
            if question.options.len() > Letter::ALL.len() {
                return Err(BackendError::Script(format!(
                    "question {} has {} options, at most {} are supported",
                    i + 1,
                    question.options.len(),
                    Letter::ALL.len()
                )));
            }
        }
        Ok(())
    }

    /// Reply for the conversation so far.
    ///
    /// Each exchange adds two messages, so the reply index is half the
    /// history length: intake prompts first, then the questions, then the
    /// closing message.
    pub fn reply_for(&self, history: &[Message]) -> Reply {
        let index = history.len() / 2;
        if let Some(prompt) = self.intake.get(index) {
            return Reply::text(prompt.clone());
        }
        match self.questions.get(index - self.intake.len()) {
            Some(question) => Reply::text(question.render()),
            None => Reply::last(self.closing.clone()),
        }
    }
}

/// Backend that walks through a [`Script`]
pub struct ScriptedBackend {
    script: Script,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            delay: None,
        }
    }

    /// Wait before each reply, so the stop control has something to stop
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn builtin() -> Result<Self, BackendError> {
        Ok(Self::new(Script::builtin()?))
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted questionnaire"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Scripted
    }

    async fn respond(&self, history: &[Message]) -> Result<Reply, BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.script.reply_for(history);
        debug!(
            history_len = history.len(),
            is_final = reply.is_final,
            "Scripted reply"
        );
        Ok(reply)
    }

    async fn is_available(&self) -> bool {
        true
    }
}
