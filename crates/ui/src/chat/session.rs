use std::fmt::Display;

use ollama_chat_llm::{ChatMessage, ChatProvider, ProviderResult};

use crate::chat::message::{Conversation, Turn};
use crate::chat::projection::{ChatProjection, InputProjection};

/// Assistant turn appended in place of a reply when a request fails.
pub const FAILURE_NOTICE: &str =
    "❌ Request failed. Please check that the Ollama service is running.";

/// Messages for the one request allowed in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub messages: Vec<ChatMessage>,
}

/// Conversation, draft, and busy flag of one chat window.
///
/// The busy flag is the submission slot: it is taken by [`ChatSession::submit`]
/// and released by [`ChatSession::resolve`], so at most one request is ever
/// outstanding.
#[derive(Debug, Default)]
pub struct ChatSession {
    conversation: Conversation,
    draft: String,
    busy: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn can_submit(&self) -> bool {
        !self.busy && !self.draft.trim().is_empty()
    }

    /// Moves the draft into the conversation and takes the submission slot.
    ///
    /// Returns `None` without touching any state when [`Self::can_submit`] is false.
    pub fn submit(&mut self) -> Option<PendingRequest> {
        if !self.can_submit() {
            return None;
        }

        let turn = Turn::user(self.draft.trim());
        let messages = self.conversation.to_request_messages(&turn);

        self.conversation.push(turn);
        self.draft.clear();
        self.busy = true;

        tracing::debug!(turn_count = self.conversation.len(), "accepted submission");

        Some(PendingRequest { messages })
    }

    /// Records how the in-flight request settled and releases the submission slot.
    pub fn resolve<E: Display>(&mut self, outcome: Result<String, E>) {
        if !self.busy {
            tracing::warn!("ignoring response that arrived while no request was in flight");
            return;
        }

        let _slot = SubmissionSlot::release_on_drop(&mut self.busy);

        let turn = match outcome {
            Ok(content) => Turn::assistant(content),
            Err(error) => {
                tracing::error!(error = %error, "chat request failed");
                Turn::assistant(FAILURE_NOTICE)
            }
        };
        self.conversation.push(turn);
    }

    pub fn project(&self) -> ChatProjection {
        ChatProjection::from_session(self)
    }

    /// Input-only view of [`Self::project`]; cheap enough to run per keystroke.
    pub fn project_input(&self) -> InputProjection {
        InputProjection::from_session(self)
    }
}

/// Clears the busy flag when dropped, including while unwinding.
struct SubmissionSlot<'a> {
    busy: &'a mut bool,
}

impl<'a> SubmissionSlot<'a> {
    fn release_on_drop(busy: &'a mut bool) -> Self {
        Self { busy }
    }
}

impl Drop for SubmissionSlot<'_> {
    fn drop(&mut self) {
        *self.busy = false;
    }
}

/// Issues the single collaborator call for `request`.
pub async fn dispatch(
    provider: &dyn ChatProvider,
    request: PendingRequest,
) -> ProviderResult<String> {
    provider.chat(request.messages).await
}
