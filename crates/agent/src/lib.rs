//! Client for an agent-serving HTTP API: session creation, message runs and
//! reply extraction from the heterogeneous turn list the service returns.

mod client;
mod config;
mod error;
mod identity;
mod protocol;
mod reply;

pub use client::{AgentBackend, BoxFuture, HttpAgentClient, create_backend};
pub use config::{AgentConfig, DEFAULT_APP_NAME, DEFAULT_BASE_URL};
pub use error::{AgentError, AgentResult};
pub use identity::{Identity, SessionId, UserId};
pub use protocol::{
    Content, CreateSessionRequest, FunctionResponse, Part, RunRequest, SessionStatePayload,
    TextPart, Turn, TurnContent, USER_ROLE, decode_turns,
};
pub use reply::{FALLBACK_REPLY, FETCH_ERROR_REPLY, extract_reply};
