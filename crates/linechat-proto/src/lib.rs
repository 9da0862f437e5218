//! # linechat-proto
//!
//! Client session engine for a small line-oriented chat protocol over TCP.
//!
//! ## Features
//!
//! - **Session state machine**: operations are checked against the current
//!   state before any byte is sent
//! - **Line framing**: `\n`-terminated lines, stray `\r` bytes dropped
//! - **Per-command reply parsing**: status literals, user listing, inbox,
//!   jokes
//! - **Structured results**: server refusals are values, transport failures
//!   are errors
//!
//! ## Quick Start
//!
//! ```ignore
//! use linechat_proto::{Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> linechat_proto::Result<()> {
//!     let mut session = Session::new(Config::builder("datakomm.work").port(1300).build());
//!
//!     session.connect().await?;
//!     session.login("alice").await?;
//!
//!     let sent = session.send_public_message("hello, world").await?;
//!     println!("{}", if sent.success { "sent" } else { &sent.message });
//!
//!     session.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! ┌──────────────┐  connect   ┌───────────┐  login   ┌────────────┐
//! │ Disconnected │ ─────────→ │ Connected │ ───────→ │ Authorized │
//! └──────────────┘            └───────────┘          └────────────┘
//!        ↑                          │                       │
//!        └──────── disconnect ──────┴───────────────────────┘
//! ```
//!
//! ## Wire Protocol
//!
//! | Command | Success reply |
//! |---|---|
//! | `sync` | `modeok` |
//! | `login <name>` | `loginok` |
//! | `msg <text>` | `msgok` (prefix) |
//! | `privmsg <user> <text>` | `msgok 1` (prefix) |
//! | `users` | `users <list>` |
//! | `inbox` | `inbox <N>` then `N` lines |
//! | `joke` | `joke <text>` |
//!
//! ## Modules
//!
//! - [`command`]: command builders and acknowledgement literals
//! - [`connection`]: configuration, connectors and line framing
//! - [`parser`]: reply decoders
//! - [`session`]: the session facade
//! - [`state`]: session states and operations
//! - [`types`]: outcomes and decoded replies

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod session;
pub mod state;
pub mod types;

pub use command::{Acknowledgement, Command, Verb};
pub use connection::{Config, ConfigBuilder, Connector, LineTransport, TcpConnector};
pub use error::{Error, Result};
pub use session::Session;
pub use state::{LoginPolicy, Operation, SessionState};
pub use types::{Outcome, Status, UserList};
