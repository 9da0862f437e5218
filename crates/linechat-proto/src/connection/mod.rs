//! Connection management: configuration, stream setup and line framing.

mod config;
mod stream;
mod transport;

pub use config::{Config, ConfigBuilder, DEFAULT_HOST, DEFAULT_PORT};
pub use stream::{Connector, TcpConnector, connect};
pub use transport::LineTransport;
