//! `linechat` - terminal client for a line-oriented TCP chat server.
//!
//! Shows a numbered menu of the actions available in the current session
//! state and runs them against the server until the user quits.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod registry;
mod settings;
mod shell;

use anyhow::Context;
use linechat_proto::Session;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use registry::Registry;
use shell::Shell;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay out of the menu.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linechat=warn,linechat_proto=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = settings::load().await.context("failed to load settings")?;
    info!(host = %settings.host, port = settings.port, "starting linechat");

    let registry = Registry::new(shell::actions()).context("invalid action table")?;
    let mut shell = Shell::new(
        Session::new(settings.to_config()),
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    );
    shell.run(&registry).await?;

    println!("Goodbye!");
    Ok(())
}
