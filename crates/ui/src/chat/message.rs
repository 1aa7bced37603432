use ollama_chat_llm::ChatMessage;

pub use ollama_chat_llm::Role;

/// One message in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        ChatMessage::new(turn.role, turn.content.clone())
    }
}

/// Ordered turns of one session.
///
/// Insertion order is display order. Turns can only be appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serializes the history followed by `next`, the shape sent to the server.
    pub fn to_request_messages(&self, next: &Turn) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .chain(std::iter::once(next))
            .map(ChatMessage::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_messages_append_next_turn_after_history() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user("hello"));
        conversation.push(Turn::assistant("hi there"));

        let messages = conversation.to_request_messages(&Turn::user("tell me a joke"));

        assert_eq!(
            messages,
            vec![
                ChatMessage::user("hello"),
                ChatMessage::assistant("hi there"),
                ChatMessage::user("tell me a joke"),
            ]
        );
        assert_eq!(conversation.len(), 2);
    }
}
