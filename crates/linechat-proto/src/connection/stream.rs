//! Opening connections to a chat server.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

/// Opens the byte stream a session talks over.
///
/// Production code uses [`TcpConnector`]; tests plug in connectors that hand
/// out in-memory streams.
pub trait Connector {
    /// Stream type produced by this connector.
    type Stream: AsyncRead + AsyncWrite + Unpin;

    /// Opens a stream to `host:port`.
    fn connect(
        &mut self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>>;
}

/// Connects over plain TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&mut self, host: &str, port: u16) -> io::Result<TcpStream> {
        connect(host, port).await
    }
}

/// Connects to a chat server over plain TCP.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect(host: &str, port: u16) -> io::Result<TcpStream> {
    let addr = format!("{host}:{port}");
    debug!(%addr, "opening TCP connection");
    let stream = TcpStream::connect(&addr).await?;
    stream.set_nodelay(true)?;
    Ok(stream)
}
