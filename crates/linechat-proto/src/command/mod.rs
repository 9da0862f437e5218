//! Chat command builder.
//!
//! Every command is a verb followed by one argument string:
//! `"<verb> <argument>\n"`. Commands without an argument go out as
//! `"<verb>\n"`, with no trailing space.

use std::fmt;

use bytes::{BufMut, BytesMut};

/// Command verb, the first token of an outgoing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Switch the server to synchronous line mode.
    Sync,
    /// Log in with a username.
    Login,
    /// Public message.
    Msg,
    /// Private message.
    PrivMsg,
    /// List online users.
    Users,
    /// Retrieve the inbox.
    Inbox,
    /// Ask for a joke.
    Joke,
}

impl Verb {
    /// Returns the verb as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Login => "login",
            Self::Msg => "msg",
            Self::PrivMsg => "privmsg",
            Self::Users => "users",
            Self::Inbox => "inbox",
            Self::Joke => "joke",
        }
    }

    /// Returns how the server acknowledges this command, for commands whose
    /// reply is a plain status line.
    #[must_use]
    pub const fn acknowledgement(self) -> Option<Acknowledgement> {
        match self {
            Self::Sync => Some(Acknowledgement::SYNC),
            Self::Login => Some(Acknowledgement::LOGIN),
            Self::Msg => Some(Acknowledgement::MSG),
            Self::PrivMsg => Some(Acknowledgement::PRIVMSG),
            Self::Users | Self::Inbox | Self::Joke => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected success reply for a status-style command.
///
/// The server is not consistent about trailing content, so each command
/// carries its own rule: some replies must match the literal exactly, others
/// only need to start with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    /// The whole line must equal the literal.
    Exact(&'static str),
    /// The first `literal.len()` characters must equal the literal.
    Prefix(&'static str),
}

impl Acknowledgement {
    /// `sync` → `modeok`.
    pub const SYNC: Self = Self::Exact("modeok");
    /// `login` → `loginok`.
    pub const LOGIN: Self = Self::Exact("loginok");
    /// `msg` → `msgok`, possibly followed by a recipient count.
    pub const MSG: Self = Self::Prefix("msgok");
    /// `privmsg` → `msgok 1`.
    pub const PRIVMSG: Self = Self::Prefix("msgok 1");

    /// Returns the expected literal.
    #[must_use]
    pub const fn literal(self) -> &'static str {
        match self {
            Self::Exact(literal) | Self::Prefix(literal) => literal,
        }
    }

    /// Returns true if `line` acknowledges the command.
    #[must_use]
    pub fn matches(self, line: &str) -> bool {
        match self {
            Self::Exact(literal) => line == literal,
            Self::Prefix(literal) => line.starts_with(literal),
        }
    }
}

/// Outgoing chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Verb,
    argument: String,
}

impl Command {
    /// Creates a command from a verb and its argument.
    #[must_use]
    pub fn new(verb: Verb, argument: impl Into<String>) -> Self {
        Self {
            verb,
            argument: argument.into(),
        }
    }

    /// `sync`
    #[must_use]
    pub fn sync() -> Self {
        Self::new(Verb::Sync, String::new())
    }

    /// `login <username>`
    #[must_use]
    pub fn login(username: impl Into<String>) -> Self {
        Self::new(Verb::Login, username)
    }

    /// `msg <text>`
    #[must_use]
    pub fn msg(text: impl Into<String>) -> Self {
        Self::new(Verb::Msg, text)
    }

    /// `privmsg <recipient> <text>`
    #[must_use]
    pub fn privmsg(recipient: &str, text: &str) -> Self {
        Self::new(Verb::PrivMsg, format!("{recipient} {text}"))
    }

    /// `users`
    #[must_use]
    pub fn users() -> Self {
        Self::new(Verb::Users, String::new())
    }

    /// `inbox`
    #[must_use]
    pub fn inbox() -> Self {
        Self::new(Verb::Inbox, String::new())
    }

    /// `joke`
    #[must_use]
    pub fn joke() -> Self {
        Self::new(Verb::Joke, String::new())
    }

    /// Returns the verb.
    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the argument string.
    #[must_use]
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// Appends the wire form of the command to `buf`, newline included.
    pub fn encode(&self, buf: &mut BytesMut) {
        let verb = self.verb.as_str();
        buf.reserve(verb.len() + self.argument.len() + 2);

        buf.put_slice(verb.as_bytes());
        if !self.argument.is_empty() {
            buf.put_u8(b' ');
            buf.put_slice(self.argument.as_bytes());
        }

        buf.put_u8(b'\n');
    }

    /// Serializes the command to bytes, newline included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.to_vec()
    }
}
