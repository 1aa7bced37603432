use crate::chat::message::Turn;
use crate::chat::session::ChatSession;

pub const WELCOME_TITLE: &str = "Ollama Chat Assistant";
pub const WELCOME_HINT: &str =
    "Type a message to start chatting (the local model needs Ollama to be running)";
pub const SEND_LABEL: &str = "Send";
pub const SENDING_LABEL: &str = "Sending...";
pub const INPUT_PLACEHOLDER: &str = "Type a message...";

/// One visual block of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptBlock {
    Welcome {
        title: &'static str,
        hint: &'static str,
    },
    Turn(Turn),
    /// Trailing "assistant is composing" placeholder.
    TypingIndicator,
}

/// Input field and send button state. Never touches the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputProjection {
    pub editable: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
}

impl InputProjection {
    pub fn from_session(session: &ChatSession) -> Self {
        let busy = session.is_busy();
        Self {
            editable: !busy,
            submit_enabled: session.can_submit(),
            submit_label: if busy { SENDING_LABEL } else { SEND_LABEL },
        }
    }
}

/// Everything the chat view draws, derived from session state alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatProjection {
    pub blocks: Vec<TranscriptBlock>,
    pub input: InputProjection,
}

impl ChatProjection {
    pub fn from_session(session: &ChatSession) -> Self {
        let conversation = session.conversation();
        let busy = session.is_busy();

        let mut blocks = Vec::with_capacity(conversation.len() + 1);
        if conversation.is_empty() {
            blocks.push(TranscriptBlock::Welcome {
                title: WELCOME_TITLE,
                hint: WELCOME_HINT,
            });
        } else {
            blocks.extend(conversation.turns().iter().cloned().map(TranscriptBlock::Turn));
        }

        if busy {
            blocks.push(TranscriptBlock::TypingIndicator);
        }

        Self {
            blocks,
            input: InputProjection::from_session(session),
        }
    }

    pub fn shows_welcome(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| matches!(block, TranscriptBlock::Welcome { .. }))
    }

    pub fn shows_typing_indicator(&self) -> bool {
        matches!(self.blocks.last(), Some(TranscriptBlock::TypingIndicator))
    }

    pub fn turn_blocks(&self) -> impl Iterator<Item = &Turn> {
        self.blocks.iter().filter_map(|block| match block {
            TranscriptBlock::Turn(turn) => Some(turn),
            TranscriptBlock::Welcome { .. } | TranscriptBlock::TypingIndicator => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::session::FAILURE_NOTICE;

    #[test]
    fn empty_conversation_shows_only_welcome() {
        let projection = ChatSession::new().project();

        assert_eq!(
            projection.blocks,
            vec![TranscriptBlock::Welcome {
                title: WELCOME_TITLE,
                hint: WELCOME_HINT,
            }]
        );
        assert_eq!(projection.turn_blocks().count(), 0);
        assert!(projection.input.editable);
        assert!(!projection.input.submit_enabled);
        assert_eq!(projection.input.submit_label, SEND_LABEL);
    }

    #[test]
    fn submit_replaces_welcome_with_turn_and_typing_indicator() {
        let mut session = ChatSession::new();
        session.update_draft("hello");
        assert!(session.project().input.submit_enabled);
        session.submit().expect("draft is submittable");

        let projection = session.project();
        assert!(!projection.shows_welcome());
        assert_eq!(
            projection.blocks,
            vec![
                TranscriptBlock::Turn(Turn::user("hello")),
                TranscriptBlock::TypingIndicator,
            ]
        );
        assert!(!projection.input.editable);
        assert!(!projection.input.submit_enabled);
        assert_eq!(projection.input.submit_label, SENDING_LABEL);
    }

    #[test]
    fn reply_removes_typing_indicator() {
        let mut session = ChatSession::new();
        session.update_draft("hello");
        session.submit().expect("draft is submittable");
        session.resolve(Ok::<_, String>("hi there".to_string()));

        let projection = session.project();
        assert!(!projection.shows_typing_indicator());
        assert_eq!(
            projection.turn_blocks().cloned().collect::<Vec<_>>(),
            vec![Turn::user("hello"), Turn::assistant("hi there")]
        );
        assert!(projection.input.editable);
        assert_eq!(projection.input.submit_label, SEND_LABEL);
    }

    #[test]
    fn failure_renders_notice_as_assistant_block() {
        let mut session = ChatSession::new();
        session.update_draft("hello");
        session.submit().expect("draft is submittable");
        session.resolve(Err::<String, _>("boom"));

        let projection = session.project();
        assert_eq!(
            projection.blocks.last(),
            Some(&TranscriptBlock::Turn(Turn::assistant(FAILURE_NOTICE)))
        );
        assert!(!projection.shows_typing_indicator());
    }

    #[test]
    fn projection_is_a_pure_function_of_state() {
        let mut session = ChatSession::new();
        assert_eq!(session.project(), session.project());

        session.update_draft("hello");
        session.submit().expect("draft is submittable");
        assert_eq!(session.project(), session.project());

        session.resolve(Ok::<_, String>("hi there".to_string()));
        session.update_draft("next");
        assert_eq!(session.project(), session.project());
    }

    #[test]
    fn input_projection_tracks_full_projection() {
        let mut session = ChatSession::new();
        assert_eq!(session.project_input(), session.project().input);

        session.update_draft("hello");
        assert_eq!(session.project_input(), session.project().input);
        assert!(session.project_input().submit_enabled);

        session.submit().expect("draft is submittable");
        session.update_draft("typed while waiting");
        let input = session.project_input();
        assert_eq!(input, session.project().input);
        assert!(!input.editable);
        assert!(!input.submit_enabled);
        assert_eq!(input.submit_label, SENDING_LABEL);

        session.resolve(Ok::<_, String>("hi there".to_string()));
        assert_eq!(session.project_input(), session.project().input);
        assert!(session.project_input().submit_enabled);
    }
}
