//! Client settings.
//!
//! Read from `<config dir>/linechat/settings.json` when present. The
//! `LINECHAT_HOST` and `LINECHAT_PORT` environment variables override the
//! file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use linechat_proto::connection::{DEFAULT_HOST, DEFAULT_PORT};
use linechat_proto::{Config, LoginPolicy};
use serde::Deserialize;

/// User-editable client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chat server host.
    pub host: String,
    /// Chat server port.
    pub port: u16,
    /// Connect timeout in seconds; waits indefinitely when unset.
    pub connect_timeout_secs: Option<u64>,
    /// Reply timeout in seconds; waits indefinitely when unset.
    pub read_timeout_secs: Option<u64>,
    /// Treat the session as logged in even when the server rejects the name.
    pub legacy_login: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_secs: None,
            read_timeout_secs: None,
            legacy_login: false,
        }
    }
}

impl Settings {
    /// Applies environment overrides looked up through `var`.
    ///
    /// # Errors
    ///
    /// Returns an error if `LINECHAT_PORT` is not a valid port number.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if let Some(host) = var("LINECHAT_HOST") {
            self.host = host;
        }
        if let Some(port) = var("LINECHAT_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("invalid LINECHAT_PORT: {port:?}"))?;
        }
        Ok(self)
    }

    /// Builds the session configuration.
    #[must_use]
    pub fn to_config(&self) -> Config {
        let mut builder = Config::builder(self.host.clone()).port(self.port);
        if let Some(secs) = self.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.read_timeout_secs {
            builder = builder.read_timeout(Duration::from_secs(secs));
        }
        if self.legacy_login {
            builder = builder.login_policy(LoginPolicy::Legacy);
        }
        builder.build()
    }
}

/// Default location of the settings file.
#[must_use]
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linechat")
        .join("settings.json")
}

/// Loads settings from the default location and the environment.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed, or an
/// override is invalid.
pub async fn load() -> anyhow::Result<Settings> {
    load_from(&settings_path())
        .await?
        .with_overrides(|name| std::env::var(name).ok())
}

/// Loads settings from `path`, falling back to defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_from(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        tracing::debug!(?path, "no settings file, using defaults");
        return Ok(Settings::default());
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}
