//! Decoded server replies.

use std::fmt;

/// Reply to a status-style command (`sync`, `login`, `msg`, `privmsg`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// True if the reply matched the command's acknowledgement.
    pub ok: bool,
    /// The reply line as received.
    pub raw: String,
}

impl Status {
    /// Creates a status.
    #[must_use]
    pub fn new(ok: bool, raw: impl Into<String>) -> Self {
        Self {
            ok,
            raw: raw.into(),
        }
    }
}

/// Users currently online, as reported by the server.
///
/// The payload after the reply header is kept as one display string; the
/// server does not document how individual names are separated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserList(String);

impl UserList {
    /// Wraps a user list payload.
    #[must_use]
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    /// Returns the payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the server listed nobody.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
