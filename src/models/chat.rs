use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const GREETING: &str = "Hello! I'm your AI farming assistant. I can help you with:\n\n\
• Crop cultivation techniques\n\
• Soil management and fertilization\n\
• Pest and disease control\n\
• Weather and irrigation advice\n\
• Market prices and trends\n\
• Sustainable farming practices\n\n\
What farming question can I help you with today?";

pub const CONNECTION_APOLOGY: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again later.";

pub const QUICK_PROMPTS: &[(&str, &str)] = &[
    ("Improve Yield", "How do I improve my crop yield?"),
    ("Fertilizer Advice", "What fertilizer should I use?"),
    ("Pest Control", "How to control pests naturally?"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}

/// Transcript of the chat panel.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::bot(GREETING)],
            pending: false,
        }
    }

    /// Queue a user message. Returns `None` while a reply is outstanding or
    /// when the text is blank.
    pub fn submit(&mut self, text: &str) -> Option<ChatMessage> {
        if self.pending || text.trim().is_empty() {
            return None;
        }
        let message = ChatMessage::user(text);
        self.messages.push(message.clone());
        self.pending = true;
        Some(message)
    }

    /// The last `n` messages before the most recent user message, sent as context.
    pub fn context(&self, n: usize) -> &[ChatMessage] {
        let end = self.messages.len().saturating_sub(1);
        let start = end.saturating_sub(n);
        &self.messages[start..end]
    }

    pub fn receive(&mut self, reply: impl Into<String>) {
        self.messages.push(ChatMessage::bot(reply));
        self.pending = false;
    }

    pub fn fail(&mut self) {
        self.receive(CONNECTION_APOLOGY);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_with_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].sender, Sender::Bot);
        assert!(!session.pending);
    }

    #[test]
    fn submit_blocks_while_pending() {
        let mut session = ChatSession::new();
        assert!(session.submit("What is NPK?").is_some());
        assert!(session.pending);
        assert!(session.submit("another").is_none());
        session.receive("Nitrogen, phosphorus, potassium.");
        assert!(!session.pending);
        assert!(session.submit("thanks").is_some());
    }

    #[test]
    fn blank_messages_are_ignored() {
        let mut session = ChatSession::new();
        assert!(session.submit("   ").is_none());
        assert_eq!(session.messages.len(), 1);
    }

    #[test]
    fn context_excludes_current_message_and_is_bounded() {
        let mut session = ChatSession::new();
        for i in 0..4 {
            session.submit(&format!("q{}", i));
            session.receive(format!("a{}", i));
        }
        session.submit("latest");
        let ctx = session.context(5);
        assert_eq!(ctx.len(), 5);
        assert_eq!(ctx.last().map(|m| m.text.as_str()), Some("a3"));
        assert!(ctx.iter().all(|m| m.text != "latest"));
    }

    #[test]
    fn failure_appends_apology() {
        let mut session = ChatSession::new();
        session.submit("hello");
        session.fail();
        assert_eq!(
            session.messages.last().map(|m| m.text.as_str()),
            Some(CONNECTION_APOLOGY)
        );
        assert!(!session.pending);
    }

    #[test]
    fn sender_serializes_lowercase() {
        let json = serde_json::to_string(&Sender::Bot).unwrap();
        assert_eq!(json, "\"bot\"");
    }
}
