/// Emitted on every edit of the message input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftChanged {
    pub text: String,
}

/// Emitted when the user asks to send the current draft.
///
/// Carries no text: the session's draft is the source of truth and decides
/// whether the submission is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Submit;

impl DraftChanged {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
