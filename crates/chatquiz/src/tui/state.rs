//! Conversation state owned by the terminal host.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use chatquiz_agent::{Backend, BackendError, Reply};
use chatquiz_core::{ChatHost, Message, Role};
use chatquiz_logging::TranscriptWriter;

use super::input::InputBuffer;

/// A finished backend request, tagged with the request it answers
#[derive(Debug)]
pub struct ReplyEvent {
    pub request_id: u64,
    pub result: Result<Reply, BackendError>,
    pub elapsed: Duration,
}

/// What handling a [`ReplyEvent`] did
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    Received { is_final: bool, elapsed: Duration },
    Failed(String),
    /// The request was stopped or superseded; the reply was dropped
    Stale,
}

struct InFlight {
    id: u64,
    handle: JoinHandle<()>,
}

/// The message log, input box and backend plumbing behind the UI.
///
/// At most one backend request runs at a time. Stopping aborts the request
/// task; a reply that still slips through carries an old id and is dropped.
pub struct ChatState {
    messages: Vec<Message>,
    input: InputBuffer,
    complete: bool,
    notice: Option<String>,
    backend: Arc<dyn Backend>,
    replies: mpsc::UnboundedSender<ReplyEvent>,
    in_flight: Option<InFlight>,
    next_request: u64,
    transcript: Option<TranscriptWriter>,
}

impl ChatState {
    pub fn new(backend: Arc<dyn Backend>) -> (Self, mpsc::UnboundedReceiver<ReplyEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                messages: Vec::new(),
                input: InputBuffer::new(),
                complete: false,
                notice: None,
                backend,
                replies: tx,
                in_flight: None,
                next_request: 0,
                transcript: None,
            },
            rx,
        )
    }

    pub fn with_transcript(mut self, transcript: TranscriptWriter) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn transcript(&self) -> Option<&TranscriptWriter> {
        self.transcript.as_ref()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Apply a finished request to the log
    pub fn handle_reply(&mut self, event: ReplyEvent) -> ReplyOutcome {
        match &self.in_flight {
            Some(current) if current.id == event.request_id => {}
            _ => {
                debug!(request_id = event.request_id, "Dropping stale reply");
                return ReplyOutcome::Stale;
            }
        }
        self.in_flight = None;

        match event.result {
            Ok(reply) => {
                let is_final = reply.is_final;
                self.push(Message::assistant(reply.content));
                self.complete = is_final;
                ReplyOutcome::Received {
                    is_final,
                    elapsed: event.elapsed,
                }
            }
            Err(e) => {
                // The user message stays so the turn can be regenerated
                warn!(error = %e, "Backend request failed");
                let message = e.to_string();
                self.notice = Some(message.clone());
                ReplyOutcome::Failed(message)
            }
        }
    }

    fn push(&mut self, message: Message) {
        if let Some(ref transcript) = self.transcript {
            transcript.write_message(self.messages.len(), &message.role.to_string(), &message.content);
        }
        self.messages.push(message);
    }

    fn request_reply(&mut self) {
        self.abort_in_flight();

        let id = self.next_request;
        self.next_request += 1;

        let backend = Arc::clone(&self.backend);
        let replies = self.replies.clone();
        let history = self.messages.clone();

        debug!(request_id = id, history_len = history.len(), "Requesting reply");
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let result = backend.respond(&history).await;
            let _ = replies.send(ReplyEvent {
                request_id: id,
                result,
                elapsed: start.elapsed(),
            });
        });
        self.in_flight = Some(InFlight { id, handle });
    }

    fn abort_in_flight(&mut self) {
        if let Some(request) = self.in_flight.take() {
            debug!(request_id = request.id, "Aborting backend request");
            request.handle.abort();
        }
    }
}

impl ChatHost for ChatState {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn raw_input(&self) -> &str {
        self.input.text()
    }

    fn set_raw_input(&mut self, text: String) {
        self.input.set(text);
    }

    fn append_message(&mut self, content: String) {
        self.push(Message::user(content));
        self.request_reply();
    }

    fn stop_generation(&mut self) {
        self.abort_in_flight();
    }

    fn regenerate_last_turn(&mut self) {
        if self.messages.last().map(|m| m.role) == Some(Role::Assistant) {
            self.messages.pop();
        }
        self.complete = false;
        info!(log_len = self.messages.len(), "Regenerating reply");
        self.request_reply();
    }

    fn truncate_log(&mut self, count: usize) {
        let len = self.messages.len().saturating_sub(count);
        self.messages.truncate(len);
        self.complete = false;
    }

    fn replace_messages(&mut self, messages: Vec<Message>) {
        self.abort_in_flight();
        self.messages = messages;
        self.complete = false;
        self.notice = None;
    }

    fn notify_error(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }
}

impl Drop for ChatState {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatquiz_agent::BackendType;

    /// Answers with the history length after `latency`
    struct EchoBackend {
        latency: Duration,
        fail: bool,
    }

    #[async_trait]
    impl Backend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        fn backend_type(&self) -> BackendType {
            BackendType::Scripted
        }

        async fn respond(&self, history: &[Message]) -> Result<Reply, BackendError> {
            tokio::time::sleep(self.latency).await;
            if self.fail {
                return Err(BackendError::ExecutionFailed("offline".to_string()));
            }
            Ok(Reply::text(format!("reply to {}", history.len())))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn echo(latency_ms: u64) -> Arc<dyn Backend> {
        Arc::new(EchoBackend {
            latency: Duration::from_millis(latency_ms),
            fail: false,
        })
    }

    #[tokio::test]
    async fn test_append_then_reply() {
        let (mut state, mut rx) = ChatState::new(echo(0));
        state.append_message("hello".to_string());
        assert!(state.is_generating());

        let event = rx.recv().await.unwrap();
        let outcome = state.handle_reply(event);
        assert!(matches!(outcome, ReplyOutcome::Received { is_final: false, .. }));
        assert!(!state.is_generating());
        assert_eq!(state.messages()[1], Message::assistant("reply to 1"));
    }

    #[tokio::test]
    async fn test_reply_after_stop_is_stale() {
        let (mut state, mut rx) = ChatState::new(echo(0));
        state.append_message("hello".to_string());
        let event = rx.recv().await.unwrap();

        state.stop_generation();
        assert_eq!(state.handle_reply(event), ReplyOutcome::Stale);
        assert_eq!(state.messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_aborts_request() {
        let (mut state, mut rx) = ChatState::new(echo(1_000));
        state.append_message("hello".to_string());
        state.stop_generation();
        assert!(!state.is_generating());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failure_keeps_user_message() {
        let backend = Arc::new(EchoBackend {
            latency: Duration::ZERO,
            fail: true,
        });
        let (mut state, mut rx) = ChatState::new(backend);
        state.append_message("hello".to_string());

        let outcome = state.handle_reply(rx.recv().await.unwrap());
        assert!(matches!(outcome, ReplyOutcome::Failed(_)));
        assert_eq!(state.messages().len(), 1);
        assert!(state.notice().unwrap().contains("offline"));
    }

    #[tokio::test]
    async fn test_regenerate_replaces_last_reply() {
        let (mut state, mut rx) = ChatState::new(echo(0));
        state.append_message("hello".to_string());
        let event = rx.recv().await.unwrap();
        state.handle_reply(event);

        state.regenerate_last_turn();
        assert_eq!(state.messages().len(), 1);
        let event = rx.recv().await.unwrap();
        state.handle_reply(event);
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].content, "reply to 1");
    }

    #[tokio::test]
    async fn test_transcript_records_messages() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = TranscriptWriter::in_dir(dir.path(), "test").unwrap();
        let path = transcript.path().to_path_buf();

        let (state, mut rx) = ChatState::new(echo(0));
        let mut state = state.with_transcript(transcript);
        state.append_message("hello".to_string());
        let event = rx.recv().await.unwrap();
        state.handle_reply(event);

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"role\":\"assistant\""));
    }
}
