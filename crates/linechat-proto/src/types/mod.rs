//! Core chat types.

mod outcome;
mod reply;

pub use outcome::Outcome;
pub use reply::{Status, UserList};
