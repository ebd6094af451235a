use crate::models::{ChatMessage, Role};

/// Buffer of every question/answer turn in a session, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    messages: Vec<ChatMessage>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn turns(&self) -> usize {
        self.messages.len() / 2
    }

    pub fn record_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::bot(answer));
    }

    /// Renders the history as `Human:`/`Assistant:` lines for prompting.
    pub fn render(&self) -> String {
        let mut buffer = String::new();
        for message in &self.messages {
            let prefix = match message.role {
                Role::User => "Human",
                Role::Bot => "Assistant",
            };
            buffer.push('\n');
            buffer.push_str(prefix);
            buffer.push_str(": ");
            buffer.push_str(&message.content);
        }
        buffer
    }
}
