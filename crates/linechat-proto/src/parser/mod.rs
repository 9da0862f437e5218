//! Chat response parser.
//!
//! Each command has its own reply shape:
//! - status commands answer with one line checked against an [`Acknowledgement`]
//! - `users` answers `users <payload>`
//! - `inbox` answers `inbox <N>` followed by `N` message lines
//! - `joke` answers `joke <text>`

use crate::command::Acknowledgement;
use crate::error::{Error, Result};
use crate::types::{Status, UserList};

/// Number of characters in the `users` reply header (`"users "`).
pub const USERS_HEADER_LEN: usize = 6;

/// Prefix of the `inbox` reply, before the message count.
pub const INBOX_PREFIX: &str = "inbox ";

/// Prefix of the `joke` reply.
pub const JOKE_PREFIX: &str = "joke ";

/// Decodes the reply to a status command.
///
/// A line that does not match is a refusal, not an error: the raw text is
/// kept so the caller can show it.
#[must_use]
pub fn decode_status(line: &str, ack: Acknowledgement) -> Status {
    Status::new(ack.matches(line), line)
}

/// Decodes the reply to `users`.
///
/// # Errors
///
/// Returns an error if the line is shorter than the reply header.
pub fn decode_user_list(line: &str) -> Result<UserList> {
    let mut chars = line.chars();
    for _ in 0..USERS_HEADER_LEN {
        if chars.next().is_none() {
            return Err(Error::protocol(format!("Users reply too short: {line:?}")));
        }
    }
    Ok(UserList::new(chars.as_str()))
}

/// Decodes the header line of the `inbox` reply and returns the message count.
///
/// # Errors
///
/// Returns an error if the line is not `inbox <N>` with `N` a non-negative
/// integer.
pub fn decode_inbox_header(line: &str) -> Result<usize> {
    let rest = line
        .strip_prefix(INBOX_PREFIX)
        .ok_or_else(|| Error::protocol(format!("Unexpected inbox reply: {line:?}")))?;

    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::protocol(format!("Invalid inbox count: {rest:?}")));
    }

    rest.parse::<usize>()
        .map_err(|_| Error::protocol(format!("Inbox count out of range: {rest:?}")))
}

/// Decodes the reply to `joke`.
///
/// # Errors
///
/// Returns an error if the line does not start with the joke prefix.
pub fn decode_joke(line: &str) -> Result<String> {
    line.strip_prefix(JOKE_PREFIX)
        .map(str::to_string)
        .ok_or_else(|| Error::protocol(format!("Unexpected joke reply: {line:?}")))
}
