//! Widget state machine, kept free of GPUI so every transition is testable.

use thesis_chat_agent::FETCH_ERROR_REPLY;

use crate::chat::message::{ChatMessage, MessageId};

/// Lifecycle of the one backend session a widget may create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    NotRequested,
    Pending,
    Started,
    Failed,
}

impl SessionPhase {
    pub fn is_started(self) -> bool {
        matches!(self, Self::Started)
    }
}

/// What a bubble click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub opened: bool,
    /// The caller must issue the session-create request.
    pub start_session: bool,
}

/// How an in-flight send settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Reply(String),
    Failed,
}

/// Ticket for one accepted send.
///
/// Not `Clone`: settling consumes it, so each send yields exactly one bot entry.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingReply {
    user_message_id: MessageId,
    text: String,
}

impl PendingReply {
    pub fn user_message_id(&self) -> MessageId {
        self.user_message_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone)]
pub struct WidgetState {
    open: bool,
    intro_visible: bool,
    session: SessionPhase,
    messages: Vec<ChatMessage>,
    draft: String,
    in_flight: usize,
    next_message_id: u64,
    revision: u64,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetState {
    pub fn new() -> Self {
        Self {
            open: false,
            intro_visible: true,
            session: SessionPhase::NotRequested,
            messages: Vec::new(),
            draft: String::new(),
            in_flight: 0,
            next_message_id: 1,
            revision: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn intro_visible(&self) -> bool {
        self.intro_visible
    }

    pub fn session_phase(&self) -> SessionPhase {
        self.session
    }

    pub fn session_started(&self) -> bool {
        self.session.is_started()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Bumped on every transcript append.
    pub fn transcript_revision(&self) -> u64 {
        self.revision
    }

    /// Bubble click: opens (requesting the session once) or closes.
    pub fn toggle(&mut self) -> ToggleOutcome {
        if self.open {
            self.open = false;
            return ToggleOutcome {
                opened: false,
                start_session: false,
            };
        }

        let start_session = self.ensure_session();
        self.open = true;
        self.intro_visible = false;
        ToggleOutcome {
            opened: true,
            start_session,
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Returns true exactly once per widget lifetime.
    ///
    /// A failed attempt is not retried; the backend may still create the
    /// session implicitly on the first run.
    pub fn ensure_session(&mut self) -> bool {
        if self.session != SessionPhase::NotRequested {
            return false;
        }

        self.session = SessionPhase::Pending;
        true
    }

    /// Records the session-create result. Ignored unless a request is pending.
    pub fn session_settled(&mut self, succeeded: bool) -> bool {
        if self.session != SessionPhase::Pending {
            return false;
        }

        self.session = if succeeded {
            SessionPhase::Started
        } else {
            SessionPhase::Failed
        };
        true
    }

    /// Accepts a user utterance.
    ///
    /// Whitespace-only text is a no-op. Otherwise the user entry is appended
    /// immediately, the draft is cleared and the loading flag raised. No
    /// guard exists against overlapping sends.
    pub fn send(&mut self, text: &str) -> Option<PendingReply> {
        if text.trim().is_empty() {
            return None;
        }

        let user_message_id = self.push(ChatMessage::user(self.peek_message_id(), text));
        self.draft.clear();
        self.in_flight += 1;

        Some(PendingReply {
            user_message_id,
            text: text.to_string(),
        })
    }

    /// Appends the bot (or error) entry for a send and lowers its share of
    /// the loading flag.
    pub fn settle(&mut self, pending: PendingReply, outcome: ReplyOutcome) -> MessageId {
        let text = match outcome {
            ReplyOutcome::Reply(text) => text,
            ReplyOutcome::Failed => FETCH_ERROR_REPLY.to_string(),
        };
        let id = self.push(ChatMessage::bot(self.peek_message_id(), text));
        self.in_flight = self.in_flight.saturating_sub(1);

        tracing::debug!(
            user_message = ?pending.user_message_id,
            bot_message = ?id,
            in_flight = self.in_flight,
            "send settled"
        );
        id
    }

    fn peek_message_id(&self) -> MessageId {
        MessageId::new(self.next_message_id)
    }

    fn push(&mut self, message: ChatMessage) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        self.next_message_id = self.next_message_id.saturating_add(1);
        self.revision = self.revision.saturating_add(1);
        id
    }
}
