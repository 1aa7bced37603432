#![deny(unsafe_code)]

/// Desktop chat window for a locally running Ollama server.
///
/// Built with GPUI and gpui-component. Conversation state lives in
/// [`chat::ChatSession`]; the views only project it.
pub mod app;
/// Chat domain, session state, and views.
pub mod chat;
/// Settings persistence and theme application.
pub mod settings;
