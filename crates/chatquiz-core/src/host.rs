use crate::Message;

/// The chat application the questionnaire runs inside.
///
/// The host owns the message log, the raw input box and the assistant
/// backend. The core only reads the log and fires actions; it never waits
/// for a reply.
pub trait ChatHost {
    /// The conversation so far
    fn messages(&self) -> &[Message];

    /// Whether an assistant reply is currently being produced
    fn is_generating(&self) -> bool;

    /// Whether the backend has signalled the end of the questionnaire
    fn is_complete(&self) -> bool;

    /// Current contents of the input box
    fn raw_input(&self) -> &str;

    fn set_raw_input(&mut self, text: String);

    /// Append a user message and start producing the assistant reply
    fn append_message(&mut self, content: String);

    fn stop_generation(&mut self);

    /// Re-request the assistant reply for the last user message
    fn regenerate_last_turn(&mut self);

    /// Drop the last `count` messages
    fn truncate_log(&mut self, count: usize);

    fn replace_messages(&mut self, messages: Vec<Message>);

    /// Show a non-blocking notice to the user
    fn notify_error(&mut self, message: &str);
}
