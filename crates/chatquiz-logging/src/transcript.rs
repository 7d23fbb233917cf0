use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Each line type in a transcript JSONL file.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptLine {
    SessionStart {
        timestamp: DateTime<Utc>,
        session_id: String,
        backend: String,
        lang: String,
        working_dir: PathBuf,
    },
    Message {
        index: usize,
        role: String,
        content: String,
        timestamp: DateTime<Utc>,
    },
    SessionEnd {
        outcome: String,
        messages: usize,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

/// Writes a session transcript as JSONL to `<data_dir>/chatquiz/transcripts/`.
///
/// Transcripts are write-only; nothing reads them back into a session.
pub struct TranscriptWriter {
    file: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl TranscriptWriter {
    /// Create a writer in the default transcripts directory.
    pub fn new(session_id: &str) -> io::Result<Self> {
        Self::in_dir(&Self::transcripts_dir()?, session_id)
    }

    /// Create a writer in `dir`. The file is named from the current UTC
    /// timestamp and a short hash of the session id.
    pub fn in_dir(dir: &Path, session_id: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;

        let timestamp_str = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();

        let mut hasher = Sha256::new();
        hasher.update(session_id.as_bytes());
        let hash = hex::encode(hasher.finalize());

        let path = dir.join(format!("{}_{}.jsonl", timestamp_str, &hash[..6]));
        let file = File::create(&path)?;

        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_start(&self, session_id: &str, backend: &str, lang: &str, working_dir: &Path) {
        self.write_line(&TranscriptLine::SessionStart {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            backend: backend.to_string(),
            lang: lang.to_string(),
            working_dir: working_dir.to_path_buf(),
        });
    }

    /// Record the message at `index` in the conversation log.
    pub fn write_message(&self, index: usize, role: &str, content: &str) {
        self.write_line(&TranscriptLine::Message {
            index,
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn write_end(&self, outcome: &str, messages: usize, duration_secs: f64) {
        self.write_line(&TranscriptLine::SessionEnd {
            outcome: outcome.to_string(),
            messages,
            duration_secs,
            timestamp: Utc::now(),
        });
    }

    fn write_line(&self, line: &TranscriptLine) {
        if let Ok(json) = serde_json::to_string(line) {
            if let Ok(mut writer) = self.file.lock() {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
            }
        }
    }

    fn transcripts_dir() -> io::Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?;
        Ok(data_dir.join("chatquiz").join("transcripts"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_uses_session_hash() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::in_dir(dir.path(), "abc").unwrap();
        let name = writer.path().file_name().unwrap().to_string_lossy().to_string();
        // sha256("abc") starts with ba7816
        assert!(name.ends_with("_ba7816.jsonl"), "{}", name);
    }

    #[test]
    fn test_writes_start_messages_end() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::in_dir(dir.path(), "session-1").unwrap();

        writer.write_start("session-1", "scripted", "en", Path::new("/tmp"));
        writer.write_message(0, "user", "Ada\nBohemian Rhapsody");
        writer.write_message(1, "assistant", "Nice choice.");
        writer.write_end("completed", 2, 12.5);

        let content = fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["type"], "session_start");
        assert_eq!(lines[0]["backend"], "scripted");
        assert_eq!(lines[1]["type"], "message");
        assert_eq!(lines[1]["content"], "Ada\nBohemian Rhapsody");
        assert_eq!(lines[2]["role"], "assistant");
        assert_eq!(lines[3]["type"], "session_end");
        assert_eq!(lines[3]["messages"], 2);
    }
}
