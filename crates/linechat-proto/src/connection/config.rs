//! Connection configuration types.

use std::time::Duration;

use crate::state::LoginPolicy;

/// Default chat server host.
pub const DEFAULT_HOST: &str = "datakomm.work";

/// Default chat server port.
pub const DEFAULT_PORT: u16 = 1300;

/// Chat session configuration.
///
/// Timeouts are off by default: connects and reads wait until the server
/// answers or closes the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Limit on establishing the TCP connection.
    pub connect_timeout: Option<Duration>,
    /// Limit on waiting for one response line.
    pub read_timeout: Option<Duration>,
    /// What a rejected login does to the session state.
    pub login_policy: LoginPolicy,
}

impl Config {
    /// Creates a configuration for `host` on the default port.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            read_timeout: None,
            login_policy: LoginPolicy::Strict,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

/// Builder for session configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: u16,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    login_policy: LoginPolicy,
}

impl ConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            read_timeout: None,
            login_policy: LoginPolicy::Strict,
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the read timeout.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Sets the login policy.
    #[must_use]
    pub const fn login_policy(mut self, policy: LoginPolicy) -> Self {
        self.login_policy = policy;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            login_policy: self.login_policy,
        }
    }
}
