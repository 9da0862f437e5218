//! Interactive menu shell around a chat session.

use std::fmt::Display;
use std::io::Write;

use linechat_proto::{Operation, Outcome, Session};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::registry::{Action, Dispatch, Flow, HandlerFuture, Registry, Selection};

/// Menu-driven front end: reads choices from `R`, prints to `W`.
pub struct Shell<R, W> {
    session: Session,
    input: Lines<R>,
    output: W,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Creates a shell around a disconnected session.
    pub fn new(session: Session, input: R, output: W) -> Self {
        Self {
            session,
            input: input.lines(),
            output,
        }
    }

    /// Returns the session.
    #[cfg(test)]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Shows the menu and runs chosen actions until quit or end of input.
    ///
    /// An open connection is closed before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run(&mut self, registry: &Registry<Self>) -> anyhow::Result<()> {
        loop {
            let state = self.session.state();
            writeln!(self.output, "{}", registry.render_menu(state))?;

            let Some(choice) = self.prompt(&registry.prompt()).await? else {
                break;
            };
            writeln!(self.output)?;

            match registry.select(&choice) {
                Selection::Invalid => self.say("Invalid input, please choose a valid action")?,
                Selection::Action(index) => match registry.dispatch(index, state, self).await? {
                    Dispatch::Ran(Flow::Quit) => break,
                    Dispatch::Ran(Flow::Continue) => {}
                    Dispatch::NotAllowed => self.say(format!(
                        "This function is not allowed in the current system state ({state})"
                    ))?,
                },
            }
            writeln!(self.output)?;
        }

        if self.session.is_connected() {
            let result = self.session.disconnect().await;
            self.report(result, "Disconnected")?;
        }
        Ok(())
    }

    /// Prints `label` and reads one line; `None` at end of input.
    async fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        Ok(self.input.next_line().await?)
    }

    fn say(&mut self, text: impl Display) -> anyhow::Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Prints the result of a session operation and returns its payload.
    ///
    /// Session errors are shown to the user, not propagated.
    fn report<T>(
        &mut self,
        result: linechat_proto::Result<Outcome<T>>,
        success: &str,
    ) -> anyhow::Result<Option<T>> {
        match result {
            Ok(outcome) if outcome.success => {
                self.say(success)?;
                Ok(outcome.data)
            }
            Ok(outcome) => {
                self.say(&outcome.message)?;
                Ok(None)
            }
            Err(err) => {
                tracing::warn!(error = %err, "operation failed");
                self.say(format!("Error: {err}"))?;
                Ok(None)
            }
        }
    }

    async fn show_users(&mut self) -> anyhow::Result<()> {
        let result = self.session.list_users().await;
        if let Some(users) = self.report(result, "The users online are: ")? {
            self.say(users)?;
        }
        Ok(())
    }
}

/// Builds the action table, in menu order.
#[must_use]
pub fn actions<R, W>() -> Vec<Action<Shell<R, W>>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    vec![
        Action {
            description: Operation::Connect.description(),
            available: |state| Operation::Connect.is_legal_in(state),
            handler: Some(connect::<R, W>),
        },
        Action {
            description: Operation::Disconnect.description(),
            available: |state| Operation::Disconnect.is_legal_in(state),
            handler: Some(disconnect::<R, W>),
        },
        Action {
            description: Operation::Login.description(),
            available: |state| Operation::Login.is_legal_in(state),
            handler: Some(login::<R, W>),
        },
        Action {
            description: Operation::SendPublicMessage.description(),
            available: |state| Operation::SendPublicMessage.is_legal_in(state),
            handler: Some(send_public_message::<R, W>),
        },
        Action {
            description: Operation::SendPrivateMessage.description(),
            available: |state| Operation::SendPrivateMessage.is_legal_in(state),
            handler: Some(send_private_message::<R, W>),
        },
        Action {
            description: Operation::FetchInbox.description(),
            available: |state| Operation::FetchInbox.is_legal_in(state),
            handler: Some(read_inbox::<R, W>),
        },
        Action {
            description: Operation::ListUsers.description(),
            available: |state| Operation::ListUsers.is_legal_in(state),
            handler: Some(list_users::<R, W>),
        },
        Action {
            description: Operation::FetchJoke.description(),
            available: |state| Operation::FetchJoke.is_legal_in(state),
            handler: Some(get_joke::<R, W>),
        },
        Action {
            description: "Quit the application",
            available: |_| true,
            handler: Some(quit::<R, W>),
        },
    ]
}

fn connect<R, W>(shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async move {
        let result = shell.session.connect().await;
        shell.report(result, "Connected")?;
        Ok(Flow::Continue)
    })
}

fn disconnect<R, W>(shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async move {
        let result = shell.session.disconnect().await;
        shell.report(result, "Disconnected")?;
        Ok(Flow::Continue)
    })
}

fn login<R, W>(shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async move {
        let Some(username) = shell.prompt("Enter desired username: ").await? else {
            return Ok(Flow::Quit);
        };
        let result = shell.session.login(&username).await;
        shell.report(result, "Login OK")?;
        Ok(Flow::Continue)
    })
}

fn send_public_message<R, W>(shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async move {
        let Some(text) = shell.prompt("Enter public message: ").await? else {
            return Ok(Flow::Quit);
        };
        let result = shell.session.send_public_message(&text).await;
        shell.report(result, "Message successfully sent!")?;
        Ok(Flow::Continue)
    })
}

fn send_private_message<R, W>(shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async move {
        shell.show_users().await?;
        if !shell.session.is_authorized() {
            return Ok(Flow::Continue);
        }

        let Some(recipient) = shell.prompt("Recipient username: ").await? else {
            return Ok(Flow::Quit);
        };
        let label = format!("Message to {recipient}: ");
        let Some(text) = shell.prompt(&label).await? else {
            return Ok(Flow::Quit);
        };
        let result = shell.session.send_private_message(&recipient, &text).await;
        shell.report(result, "DM sent successfully")?;
        Ok(Flow::Continue)
    })
}

fn read_inbox<R, W>(shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async move {
        let result = shell.session.fetch_inbox().await;
        if let Some(messages) = shell.report(result, "Inbox retrieved")? {
            shell.say(format!("You have {} mail(s)", messages.len()))?;
            for message in messages {
                shell.say(message)?;
            }
        }
        Ok(Flow::Continue)
    })
}

fn list_users<R, W>(shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async move {
        shell.show_users().await?;
        Ok(Flow::Continue)
    })
}

fn get_joke<R, W>(shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async move {
        let result = shell.session.fetch_joke().await;
        if let Some(joke) = shell.report(result, "Here's one:")? {
            shell.say(joke)?;
        }
        Ok(Flow::Continue)
    })
}

fn quit<R, W>(_shell: &mut Shell<R, W>) -> HandlerFuture<'_>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    Box::pin(async { Ok(Flow::Quit) })
}
