#![deny(unsafe_code)]

/// Floating chat widget built with GPUI and gpui-component.
///
/// The widget opens a chat window from a bubble button, lazily creates one
/// backend session and exchanges text messages with an agent-serving API.
pub mod app;
/// Chat state, transcript and window components.
pub mod chat;
/// Configuration resolution.
pub mod settings;
