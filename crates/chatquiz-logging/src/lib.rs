//! # chatquiz-logging
//!
//! Logging for the chatquiz terminal client.
//!
//! The terminal belongs to the chat UI, so all tracing output goes to a
//! daily-rolling file instead of stderr.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured questionnaire events
//! - [`QuizEvent`] - Event types
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//! - [`TranscriptWriter`] - JSONL record of a session's messages

mod events;
mod transcript;

pub use events::{LogFormat, Logger, QuizEvent};
pub use transcript::{TranscriptLine, TranscriptWriter};

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the rolling tracing log
pub const LOG_FILE_PREFIX: &str = "chatquiz.log";

/// Initialize tracing for the application.
///
/// Returns the appender guard; dropping it flushes and stops the writer, so
/// keep it alive for the life of the program.
pub fn init_tracing(level: &str, format: LogFormat, log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(writer).with_target(false))
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_target(false),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
        }
    }

    Ok(guard)
}

/// Default directory for log files: `<data_dir>/chatquiz/logs`
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("chatquiz").join("logs"))
}
