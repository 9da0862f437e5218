//! Menu action registry.
//!
//! Each entry pairs a description with a predicate on the session state and
//! a handler. The table is validated once at startup: an entry without a
//! handler is a configuration error, not something discovered when a user
//! picks it.

use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;

use linechat_proto::SessionState;

/// What the menu loop does after an action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Show the menu again.
    Continue,
    /// Leave the menu loop.
    Quit,
}

/// Future returned by an action handler.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Flow>> + 'a>>;

/// Action handler operating on a context such as the interactive shell.
pub type Handler<Ctx> = for<'a> fn(&'a mut Ctx) -> HandlerFuture<'a>;

/// One entry of the action table, as declared.
pub struct Action<Ctx> {
    /// Menu text.
    pub description: &'static str,
    /// Returns true if the action may run in the given state.
    pub available: fn(SessionState) -> bool,
    /// Handler to run; `None` is rejected by [`Registry::new`].
    pub handler: Option<Handler<Ctx>>,
}

/// Errors found while validating the action table.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The table has no entries.
    #[error("action table is empty")]
    Empty,

    /// An entry has no handler.
    #[error("action {index} ({description:?}) has no handler")]
    MissingHandler {
        /// One-based menu number of the entry.
        index: usize,
        /// Menu text of the entry.
        description: &'static str,
    },
}

struct Entry<Ctx> {
    description: &'static str,
    available: fn(SessionState) -> bool,
    handler: Handler<Ctx>,
}

/// Result of looking up a menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A valid menu number, as a zero-based index.
    Action(usize),
    /// Not a number, or out of range.
    Invalid,
}

/// Result of dispatching a menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The handler ran.
    Ran(Flow),
    /// The action is not available in the current state.
    NotAllowed,
}

/// Validated action table.
pub struct Registry<Ctx> {
    entries: Vec<Entry<Ctx>>,
}

impl<Ctx> Registry<Ctx> {
    /// Validates `actions` and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is empty or an entry has no handler.
    pub fn new(actions: Vec<Action<Ctx>>) -> Result<Self, RegistryError> {
        if actions.is_empty() {
            return Err(RegistryError::Empty);
        }

        let entries = actions
            .into_iter()
            .enumerate()
            .map(|(i, action)| {
                let handler = action.handler.ok_or(RegistryError::MissingHandler {
                    index: i + 1,
                    description: action.description,
                })?;
                Ok(Entry {
                    description: action.description,
                    available: action.available,
                    handler,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Number of registered actions. Never zero once validated.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Renders the menu for `state`.
    ///
    /// Numbers stay fixed across states; unavailable actions are hidden.
    #[must_use]
    pub fn render_menu(&self, state: SessionState) -> String {
        let mut menu = String::new();
        let _ = writeln!(menu, "==============================================");
        let _ = writeln!(menu, "What do you want to do now? ");
        let _ = writeln!(menu, "==============================================");
        let _ = writeln!(menu, "Available options:");
        for (i, entry) in self.entries.iter().enumerate() {
            if (entry.available)(state) {
                let _ = writeln!(menu, "  {}) {}", i + 1, entry.description);
            }
        }
        menu
    }

    /// Returns the prompt asking for a menu number.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("Enter the number of your choice (1..{}):", self.len())
    }

    /// Parses a menu choice typed by the user.
    #[must_use]
    pub fn select(&self, input: &str) -> Selection {
        match input.trim().parse::<usize>() {
            Ok(n) if (1..=self.len()).contains(&n) => Selection::Action(n - 1),
            _ => Selection::Invalid,
        }
    }

    /// Runs the action at `index` if it is available in `state`.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns.
    pub async fn dispatch(
        &self,
        index: usize,
        state: SessionState,
        ctx: &mut Ctx,
    ) -> anyhow::Result<Dispatch> {
        let Some(entry) = self.entries.get(index) else {
            return Ok(Dispatch::NotAllowed);
        };
        if !(entry.available)(state) {
            return Ok(Dispatch::NotAllowed);
        }
        tracing::debug!(action = entry.description, %state, "running action");
        let flow = (entry.handler)(ctx).await?;
        Ok(Dispatch::Ran(flow))
    }
}
