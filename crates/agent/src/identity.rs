use std::fmt;

use rand::Rng;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_LEN: usize = 8;

/// Opaque user identifier sent to the agent service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque session identifier sent to the agent service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User/session pair owned by one widget instance.
///
/// Generated once at construction and never persisted, so every widget
/// instance talks to the backend under a fresh identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub session_id: SessionId,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            session_id: SessionId::new(session_id),
        }
    }

    /// Generates `u_xxxxxxxx` / `s_xxxxxxxx` identifiers from lowercase base-36.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            user_id: UserId(random_id(&mut rng, "u_")),
            session_id: SessionId(random_id(&mut rng, "s_")),
        }
    }
}

fn random_id(rng: &mut impl Rng, prefix: &str) -> String {
    let mut id = String::with_capacity(prefix.len() + ID_RANDOM_LEN);
    id.push_str(prefix);
    for _ in 0..ID_RANDOM_LEN {
        let index = rng.gen_range(0..ID_ALPHABET.len());
        id.push(char::from(ID_ALPHABET[index]));
    }
    id
}
