use serde::{Deserialize, Serialize};

/// Model identifier sent with every chat request unless settings override it.
pub const DEFAULT_MODEL: &str = "gemma3:1b";

/// Chat endpoint of a locally running Ollama server.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/chat";

/// Chat speaker role as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One serialized conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
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
}

/// Body of a non-streaming `/api/chat` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    stream: bool,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [ChatMessage]) -> Self {
        Self {
            model,
            messages,
            stream: false,
        }
    }
}

/// The only response shape accepted from the server; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

impl ChatResponse {
    pub fn into_content(self) -> String {
        self.message.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_wire_shape() {
        let messages = vec![
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi there"),
            ChatMessage::user("how are you?"),
        ];
        let body = serde_json::to_value(ChatRequest::new(DEFAULT_MODEL, &messages))
            .expect("request serializes");

        assert_eq!(
            body,
            serde_json::json!({
                "model": "gemma3:1b",
                "messages": [
                    {"role": "user", "content": "hello"},
                    {"role": "assistant", "content": "hi there"},
                    {"role": "user", "content": "how are you?"},
                ],
                "stream": false,
            })
        );
    }

    #[test]
    fn response_ignores_extra_fields() {
        let payload = r#"{
            "model": "gemma3:1b",
            "created_at": "2025-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "hi there"},
            "done": true,
            "total_duration": 12345
        }"#;

        let response: ChatResponse = serde_json::from_str(payload).expect("response decodes");
        assert_eq!(response.into_content(), "hi there");
    }

    #[test]
    fn response_without_content_is_rejected() {
        assert!(serde_json::from_str::<ChatResponse>(r#"{"message": {"role": "assistant"}}"#).is_err());
        assert!(serde_json::from_str::<ChatResponse>(r#"{"error": "model not found"}"#).is_err());
        assert!(serde_json::from_str::<ChatResponse>(r#"{"message": {"content": 42}}"#).is_err());
    }
}
