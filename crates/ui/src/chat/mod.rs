/// Event contracts for chat module wiring.
pub mod events;
/// Transcript entities.
pub mod message;
pub mod message_input;
pub mod message_list;
pub mod scroll_manager;
/// GPUI-free widget state machine.
pub mod state;
pub mod view;

pub use events::Submit;
pub use message::{ChatMessage, MessageId, Sender};
pub use message_input::MessageInput;
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use state::{PendingReply, ReplyOutcome, SessionPhase, ToggleOutcome, WidgetState};
pub use view::ChatView;
