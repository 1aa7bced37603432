/// Event contracts between the input and the chat view.
pub mod events;
/// Turns and the append-only conversation.
pub mod message;
pub mod message_input;
pub mod message_list;
/// Pure projection of session state into what the view draws.
pub mod projection;
pub mod scroll_manager;
/// Draft, busy flag, and request lifecycle of one chat window.
pub mod session;
pub mod view;

pub use events::{DraftChanged, Submit};
pub use message::{Conversation, Role, Turn};
pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use projection::{ChatProjection, InputProjection, TranscriptBlock};
pub use scroll_manager::{ScrollFollow, ScrollManager, SmoothScroll};
pub use session::{ChatSession, FAILURE_NOTICE, PendingRequest, dispatch};
pub use view::ChatView;
