//! Session state machine.
//!
//! A session moves between three states:
//!
//! ```text
//!                 connect                 login (loginok)
//! Disconnected ────────────→ Connected ────────────────→ Authorized
//!      ↑                         │                            │
//!      └──────── disconnect ─────┴──────── disconnect ────────┘
//! ```
//!
//! Every [`Operation`] carries the set of states it is legal in. The session
//! checks that set before touching the connection, so an illegal operation
//! never produces any I/O.

use std::fmt;

use crate::error::{Error, Result};

/// State of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No connection to a server.
    #[default]
    Disconnected,
    /// Connected, but no username has been accepted yet.
    Connected,
    /// Connected and logged in.
    Authorized,
}

impl SessionState {
    /// All states, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Disconnected, Self::Connected, Self::Authorized];

    /// Returns the lowercase name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Authorized => "authorized",
        }
    }

    /// Returns true if a connection is open in this state.
    #[must_use]
    pub const fn has_connection(self) -> bool {
        matches!(self, Self::Connected | Self::Authorized)
    }

    /// Computes the state after `operation` completed a round trip.
    ///
    /// `acknowledged` tells whether the server sent the expected reply. Only
    /// connect, disconnect and login move the session; everything else keeps
    /// the current state whatever the server said.
    #[must_use]
    pub const fn transition(
        self,
        operation: Operation,
        acknowledged: bool,
        policy: LoginPolicy,
    ) -> Self {
        match operation {
            // The sync handshake does not decide the state: once the socket
            // is open the session is connected.
            Operation::Connect => Self::Connected,
            Operation::Disconnect => Self::Disconnected,
            Operation::Login => {
                if acknowledged || matches!(policy, LoginPolicy::Legacy) {
                    Self::Authorized
                } else {
                    self
                }
            }
            Operation::SendPublicMessage
            | Operation::SendPrivateMessage
            | Operation::ListUsers
            | Operation::FetchInbox
            | Operation::FetchJoke => self,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rejected login affects the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPolicy {
    /// Enter `Authorized` only after the server answered `loginok`.
    #[default]
    Strict,
    /// Enter `Authorized` as soon as the login command was answered, even
    /// when the answer is a rejection. Matches older clients of this
    /// protocol that recorded the login before reading the reply.
    Legacy,
}

/// An operation a session can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Open the connection and negotiate line mode.
    Connect,
    /// Close the connection.
    Disconnect,
    /// Log in with a username.
    Login,
    /// Send a message to every user.
    SendPublicMessage,
    /// Send a message to one user.
    SendPrivateMessage,
    /// List the users currently online.
    ListUsers,
    /// Retrieve messages waiting in the inbox.
    FetchInbox,
    /// Ask the server for a joke.
    FetchJoke,
}

const ANY_CONNECTED: &[SessionState] = &[SessionState::Connected, SessionState::Authorized];

impl Operation {
    /// All operations, in menu order.
    pub const ALL: [Self; 8] = [
        Self::Connect,
        Self::Disconnect,
        Self::Login,
        Self::SendPublicMessage,
        Self::SendPrivateMessage,
        Self::FetchInbox,
        Self::ListUsers,
        Self::FetchJoke,
    ];

    /// Returns the states in which this operation may run.
    #[must_use]
    pub const fn legal_states(self) -> &'static [SessionState] {
        match self {
            Self::Connect => &[SessionState::Disconnected],
            Self::SendPrivateMessage => &[SessionState::Authorized],
            Self::Disconnect
            | Self::Login
            | Self::SendPublicMessage
            | Self::ListUsers
            | Self::FetchInbox
            | Self::FetchJoke => ANY_CONNECTED,
        }
    }

    /// Returns true if the operation may run in `state`.
    #[must_use]
    pub fn is_legal_in(self, state: SessionState) -> bool {
        self.legal_states().contains(&state)
    }

    /// Fails with [`Error::IllegalState`] unless the operation may run in `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` is not in [`Self::legal_states`].
    pub fn check(self, state: SessionState) -> Result<()> {
        if self.is_legal_in(state) {
            Ok(())
        } else {
            Err(Error::IllegalState {
                operation: self,
                state,
            })
        }
    }

    /// Short machine-friendly name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Login => "login",
            Self::SendPublicMessage => "send-public-message",
            Self::SendPrivateMessage => "send-private-message",
            Self::ListUsers => "list-users",
            Self::FetchInbox => "fetch-inbox",
            Self::FetchJoke => "fetch-joke",
        }
    }

    /// Human-readable description, suitable for a menu entry.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Connect => "Connect to a chat server",
            Self::Disconnect => "Disconnect from the server",
            Self::Login => "Authorize (log in)",
            Self::SendPublicMessage => "Send a public message",
            Self::SendPrivateMessage => "Send a private message",
            Self::ListUsers => "See list of users",
            Self::FetchInbox => "Read messages in the inbox",
            Self::FetchJoke => "Get a joke",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
