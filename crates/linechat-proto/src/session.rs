//! High-level chat session.
//!
//! `Session` owns the connection and the [`SessionState`], and is the only
//! way to talk to the server. Every operation follows the same steps:
//!
//! 1. check that the operation is legal in the current state (no I/O if not)
//! 2. send one command and read its reply
//! 3. apply the resulting state transition
//! 4. return an [`Outcome`]
//!
//! Server refusals come back as `Ok(Outcome { success: false, .. })`.
//! Transport failures come back as `Err` and leave the session
//! `Disconnected`, since the connection cannot be trusted afterwards.
//!
//! ## Example
//!
//! ```ignore
//! use linechat_proto::{Config, Session};
//!
//! let mut session = Session::new(Config::new("chat.example.com"));
//! session.connect().await?;
//!
//! let login = session.login("alice").await?;
//! if !login.success {
//!     println!("{}", login.message);
//! }
//!
//! let inbox = session.fetch_inbox().await?;
//! for message in inbox.data.unwrap_or_default() {
//!     println!("{message}");
//! }
//!
//! session.disconnect().await?;
//! ```

use std::io;

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::connection::{Config, Connector, LineTransport, TcpConnector};
use crate::error::{Error, Result};
use crate::parser::{decode_inbox_header, decode_joke, decode_status, decode_user_list};
use crate::state::{Operation, SessionState};
use crate::types::{Outcome, Status, UserList};

/// Client session with one chat server.
pub struct Session<C: Connector = TcpConnector> {
    config: Config,
    connector: C,
    connection: Option<LineTransport<C::Stream>>,
    state: SessionState,
}

impl Session<TcpConnector> {
    /// Creates a disconnected session that connects over TCP.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Session<C> {
    /// Creates a disconnected session that opens streams with `connector`.
    #[must_use]
    pub const fn with_connector(config: Config, connector: C) -> Self {
        Self {
            config,
            connector,
            connection: None,
            state: SessionState::Disconnected,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true if a connection is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns true if the server accepted a login on this connection.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self.state, SessionState::Authorized)
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the operations that are legal right now.
    #[must_use]
    pub fn available_operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| op.is_legal_in(self.state))
            .collect()
    }

    /// Returns true if the server sent bytes that no operation has read yet.
    #[must_use]
    pub fn has_pending_input(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(LineTransport::has_buffered_input)
    }

    /// Connects to the configured server and switches it to line mode.
    ///
    /// Once the TCP connection is up the session is `Connected`, even if the
    /// server then refuses `sync`; that refusal is reported as an
    /// unsuccessful outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not disconnected, if the
    /// connection cannot be established (the session stays
    /// `Disconnected`), or if the connection fails during the handshake.
    pub async fn connect(&mut self) -> Result<Outcome> {
        Operation::Connect.check(self.state)?;

        let stream = self.open_stream().await?;
        self.connection =
            Some(LineTransport::new(stream).with_read_timeout(self.config.read_timeout));
        self.apply(Operation::Connect, true);

        let status = self.exchange_status(Command::sync()).await?;
        if status.ok {
            Ok(Outcome::ok(status.raw))
        } else {
            warn!(reply = %status.raw, "server did not accept sync mode");
            Ok(Outcome::rejected(status.raw))
        }
    }

    /// Closes the connection.
    ///
    /// Closing is best effort: a failure to shut the stream down is logged
    /// and the session still ends up `Disconnected`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no connection to close.
    pub async fn disconnect(&mut self) -> Result<Outcome> {
        Operation::Disconnect.check(self.state)?;

        if let Some(mut transport) = self.connection.take()
            && let Err(err) = transport.shutdown().await
        {
            warn!(error = %err, "error while closing connection");
        }
        self.apply(Operation::Disconnect, true);

        Ok(Outcome::ok("disconnected"))
    }

    /// Logs in as `username`.
    ///
    /// On `loginok` the session becomes `Authorized`. A refusal is returned
    /// with the server's text; whether it still authorizes the session is
    /// decided by [`Config::login_policy`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not connected or the connection fails.
    pub async fn login(&mut self, username: &str) -> Result<Outcome> {
        Operation::Login.check(self.state)?;

        let status = self.exchange_status(Command::login(username)).await?;
        self.apply(Operation::Login, status.ok);

        Ok(status_outcome(status))
    }

    /// Sends `text` to every user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not connected or the connection fails.
    pub async fn send_public_message(&mut self, text: &str) -> Result<Outcome> {
        Operation::SendPublicMessage.check(self.state)?;

        let status = self.exchange_status(Command::msg(text)).await?;
        self.apply(Operation::SendPublicMessage, status.ok);

        Ok(status_outcome(status))
    }

    /// Sends `text` to `recipient` only.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not authorized or the connection fails.
    pub async fn send_private_message(&mut self, recipient: &str, text: &str) -> Result<Outcome> {
        Operation::SendPrivateMessage.check(self.state)?;

        let status = self
            .exchange_status(Command::privmsg(recipient, text))
            .await?;
        self.apply(Operation::SendPrivateMessage, status.ok);

        Ok(status_outcome(status))
    }

    /// Lists the users currently online.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not connected, the connection
    /// fails, or the reply is malformed.
    pub async fn list_users(&mut self) -> Result<Outcome<UserList>> {
        Operation::ListUsers.check(self.state)?;

        let line = self.round_trip(&Command::users()).await?;
        let users = decode_user_list(&line)?;
        self.apply(Operation::ListUsers, true);

        Ok(Outcome::accepted(line, users))
    }

    /// Retrieves the messages waiting in the inbox, oldest first.
    ///
    /// Reads the `inbox <N>` header and then exactly `N` message lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not connected, the connection
    /// fails, or the header has no valid count.
    pub async fn fetch_inbox(&mut self) -> Result<Outcome<Vec<String>>> {
        Operation::FetchInbox.check(self.state)?;

        let header = self.round_trip(&Command::inbox()).await?;
        let count = decode_inbox_header(&header)?;
        debug!(count, "reading inbox messages");

        let mut messages = Vec::new();
        for _ in 0..count {
            messages.push(self.read_line().await?);
        }
        self.apply(Operation::FetchInbox, true);

        Ok(Outcome::accepted(header, messages))
    }

    /// Asks the server for a joke.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not connected, the connection
    /// fails, or the reply is not a joke.
    pub async fn fetch_joke(&mut self) -> Result<Outcome<String>> {
        Operation::FetchJoke.check(self.state)?;

        let line = self.round_trip(&Command::joke()).await?;
        let joke = decode_joke(&line)?;
        self.apply(Operation::FetchJoke, true);

        Ok(Outcome::accepted(line, joke))
    }

    async fn open_stream(&mut self) -> Result<C::Stream> {
        let Config {
            host,
            port,
            connect_timeout,
            ..
        } = &self.config;
        info!(%host, port, "connecting");

        let connecting = self.connector.connect(host, *port);
        let stream = match *connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connecting)
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => connecting.await?,
        };

        Ok(stream)
    }

    async fn exchange_status(&mut self, command: Command) -> Result<Status> {
        let verb = command.verb();
        let ack = verb
            .acknowledgement()
            .ok_or_else(|| Error::protocol(format!("{verb} has no status reply")))?;

        let line = self.round_trip(&command).await?;
        Ok(decode_status(&line, ack))
    }

    /// Sends one command and reads the first line of its reply.
    async fn round_trip(&mut self, command: &Command) -> Result<String> {
        debug!(verb = %command.verb(), "sending command");

        let result = match self.connection.as_mut() {
            Some(transport) => match transport.write_command(command).await {
                Ok(()) => transport.read_line().await,
                Err(err) => Err(err),
            },
            None => Err(not_connected()),
        };
        self.settle(result)
    }

    async fn read_line(&mut self) -> Result<String> {
        let result = match self.connection.as_mut() {
            Some(transport) => transport.read_line().await,
            None => Err(not_connected()),
        };
        self.settle(result)
    }

    /// Drops the connection if `result` is a transport failure.
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result
            && err.is_transport()
            && self.connection.take().is_some()
        {
            warn!(error = %err, "connection lost");
            self.state = SessionState::Disconnected;
        }
        result
    }

    fn apply(&mut self, operation: Operation, acknowledged: bool) {
        let next = self
            .state
            .transition(operation, acknowledged, self.config.login_policy);
        if next != self.state {
            info!(from = %self.state, to = %next, %operation, "session state changed");
            self.state = next;
        }
        debug_assert_eq!(self.connection.is_some(), self.state.has_connection());
    }
}

fn status_outcome(status: Status) -> Outcome {
    if status.ok {
        Outcome::ok(status.raw)
    } else {
        Outcome::rejected(status.raw)
    }
}

fn not_connected() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::NotConnected,
        "no open connection",
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::LoginPolicy;
    use tokio_test::io::{Builder, Mock};

    /// Hands out one prepared mock stream, then refuses.
    struct MockConnector {
        stream: Option<Mock>,
        calls: usize,
    }

    impl MockConnector {
        fn new(stream: Mock) -> Self {
            Self {
                stream: Some(stream),
                calls: 0,
            }
        }

        fn refusing() -> Self {
            Self {
                stream: None,
                calls: 0,
            }
        }
    }

    impl Connector for MockConnector {
        type Stream = Mock;

        async fn connect(&mut self, _host: &str, _port: u16) -> io::Result<Mock> {
            self.calls += 1;
            self.stream
                .take()
                .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        }
    }

    fn session(mock: Mock) -> Session<MockConnector> {
        Session::with_connector(Config::new("chat.test"), MockConnector::new(mock))
    }

    async fn connected(builder: &mut Builder) -> Session<MockConnector> {
        let mut session = session(builder.build());
        let outcome = session.connect().await.unwrap();
        assert!(outcome.success);
        session
    }

    #[tokio::test]
    async fn test_connect_sync_ok() {
        let mut session = session(Builder::new().write(b"sync\n").read(b"modeok\r\n").build());

        let outcome = session.connect().await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "modeok");
        assert_eq!(session.state(), SessionState::Connected);
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_connect_sync_refused_stays_connected() {
        let mut session = session(
            Builder::new()
                .write(b"sync\n")
                .read(b"cmderr unknown mode\n")
                .build(),
        );

        let outcome = session.connect().await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "cmderr unknown mode");
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_connect_refused_stays_disconnected() {
        let mut session = Session::with_connector(Config::default(), MockConnector::refusing());

        let err = session.connect().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_connect_when_connected_is_illegal() {
        let mut builder = Builder::new();
        builder.write(b"sync\n").read(b"modeok\n");
        let mut session = connected(&mut builder).await;

        let err = session.connect().await.unwrap_err();
        assert!(err.is_illegal_state());
        assert_eq!(session.connector.calls, 1);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_connection_lost_during_sync() {
        let mut session = session(Builder::new().write(b"sync\n").read(b"mode").build());

        let err = session.connect().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_login_ok() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"login alice\n")
            .read(b"loginok\n");
        let mut session = connected(&mut builder).await;

        let outcome = session.login("alice").await.unwrap();
        assert!(outcome.success);
        assert_eq!(session.state(), SessionState::Authorized);
        assert!(session.is_authorized());
    }

    #[tokio::test]
    async fn test_login_rejected_strict() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"login alice\n")
            .read(b"username taken\n");
        let mut session = connected(&mut builder).await;

        let outcome = session.login("alice").await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "username taken");
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_login_rejected_legacy() {
        let mock = Builder::new()
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"login alice\n")
            .read(b"username taken\n")
            .build();
        let config = Config::builder("chat.test")
            .login_policy(LoginPolicy::Legacy)
            .build();
        let mut session = Session::with_connector(config, MockConnector::new(mock));
        session.connect().await.unwrap();

        let outcome = session.login("alice").await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "username taken");
        assert_eq!(session.state(), SessionState::Authorized);
    }

    #[tokio::test]
    async fn test_public_message() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"msg hello all\n")
            .read(b"msgok 2\n")
            .write(b"msg again\n")
            .read(b"msgerr spam detected\n");
        let mut session = connected(&mut builder).await;

        assert!(session.send_public_message("hello all").await.unwrap().success);

        let outcome = session.send_public_message("again").await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "msgerr spam detected");
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_private_message_requires_exact_ack() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"login alice\n")
            .read(b"loginok\n")
            .write(b"privmsg bob hi\n")
            .read(b"msgok 1\n")
            .write(b"privmsg bob hi\n")
            .read(b"msgok\n");
        let mut session = connected(&mut builder).await;
        session.login("alice").await.unwrap();

        assert!(session.send_private_message("bob", "hi").await.unwrap().success);

        let outcome = session.send_private_message("bob", "hi").await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "msgok");
        assert_eq!(session.state(), SessionState::Authorized);
    }

    #[tokio::test]
    async fn test_private_message_needs_login() {
        let mut builder = Builder::new();
        builder.write(b"sync\n").read(b"modeok\n");
        let mut session = connected(&mut builder).await;

        let err = session.send_private_message("bob", "hi").await.unwrap_err();
        assert!(err.is_illegal_state());
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"users\n")
            .read(b"users alice bob\r\n");
        let mut session = connected(&mut builder).await;

        let outcome = session.list_users().await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.data.unwrap().as_str(), "alice bob");
    }

    #[tokio::test]
    async fn test_fetch_inbox() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"inbox\n")
            .read(b"inbox 3\n")
            .read(b"hi\r\nyo\n")
            .read(b"later\n");
        let mut session = connected(&mut builder).await;

        let outcome = session.fetch_inbox().await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.data.unwrap(), vec!["hi", "yo", "later"]);
        assert!(!session.has_pending_input());
    }

    #[tokio::test]
    async fn test_fetch_empty_inbox() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"inbox\n")
            .read(b"inbox 0\n");
        let mut session = connected(&mut builder).await;

        let outcome = session.fetch_inbox().await.unwrap();
        assert_eq!(outcome.data.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_fetch_inbox_bad_count_keeps_state() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"inbox\n")
            .read(b"inbox many\n");
        let mut session = connected(&mut builder).await;

        let err = session.fetch_inbox().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert_eq!(session.state(), SessionState::Connected);
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_fetch_inbox_truncated_disconnects() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"inbox\n")
            .read(b"inbox 2\nonly one\n");
        let mut session = connected(&mut builder).await;

        let err = session.fetch_inbox().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_fetch_inbox_huge_count_then_eof() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"inbox\n")
            .read(b"inbox 18446744073709551615\n");
        let mut session = connected(&mut builder).await;

        let err = session.fetch_inbox().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_write_failure_disconnects() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let mut session = connected(&mut builder).await;
        // tokio-test's Builder retains a clone of the write error; release it
        // so the mock can take ownership when the error fires.
        drop(builder);

        let err = session.login("alice").await.unwrap_err();
        assert!(matches!(&err, Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());

        let err = session.send_public_message("hi").await.unwrap_err();
        assert!(err.is_illegal_state());
    }

    #[tokio::test]
    async fn test_fetch_joke() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"joke\n")
            .read(b"joke Why do programmers prefer dark mode?\n");
        let mut session = connected(&mut builder).await;

        let outcome = session.fetch_joke().await.unwrap();
        assert_eq!(
            outcome.data.unwrap(),
            "Why do programmers prefer dark mode?"
        );
    }

    #[tokio::test]
    async fn test_disconnect_twice() {
        let mut builder = Builder::new();
        builder.write(b"sync\n").read(b"modeok\n");
        let mut session = connected(&mut builder).await;

        assert!(session.disconnect().await.unwrap().success);
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());

        let err = session.disconnect().await.unwrap_err();
        assert!(err.is_illegal_state());
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_reconnect_after_disconnect() {
        let mut builder = Builder::new();
        builder.write(b"sync\n").read(b"modeok\n");
        let mut session = connected(&mut builder).await;
        session.disconnect().await.unwrap();

        session.connector.stream = Some(Builder::new().write(b"sync\n").read(b"modeok\n").build());
        assert!(session.connect().await.unwrap().success);
        assert_eq!(session.connector.calls, 2);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_available_operations() {
        let mut builder = Builder::new();
        builder
            .write(b"sync\n")
            .read(b"modeok\n")
            .write(b"login alice\n")
            .read(b"loginok\n");
        let mut session = session(builder.build());
        assert_eq!(session.available_operations(), vec![Operation::Connect]);

        session.connect().await.unwrap();
        assert!(!session.available_operations().contains(&Operation::SendPrivateMessage));
        assert!(!session.available_operations().contains(&Operation::Connect));

        session.login("alice").await.unwrap();
        assert!(session.available_operations().contains(&Operation::SendPrivateMessage));
    }
}
