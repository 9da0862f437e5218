//! Newline-delimited I/O over a byte stream.
//!
//! Lines end at `\n`. Carriage returns are tolerated anywhere before the
//! newline and dropped, so `"modeok\r\n"` and `"mode\rok\n"` both read as
//! `"modeok"`. There is no line-length cap.

use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::trace;

use crate::command::Command;
use crate::error::{Error, Result};

/// Default buffer size for reading and writing.
const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Line-oriented connection to a chat server.
pub struct LineTransport<S> {
    reader: BufReader<S>,
    write_buffer: BytesMut,
    read_timeout: Option<Duration>,
}

impl<S> LineTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an open stream. Reads wait indefinitely.
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
            read_timeout: None,
        }
    }

    /// Limits how long [`Self::read_line`] waits for a complete line.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Encodes `command` into the write buffer, then sends and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_command(&mut self, command: &Command) -> Result<()> {
        self.write_buffer.clear();
        command.encode(&mut self.write_buffer);
        trace!(verb = %command.verb(), argument = command.argument(), ">>");

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buffer).await?;
        stream.flush().await?;

        Ok(())
    }

    /// Writes `data` as is and flushes. The caller supplies the newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_line(&mut self, data: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(data);
        trace!(line = %text.trim_end(), ">>");

        let stream = self.reader.get_mut();
        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    /// Reads one line, without its `\n` and with every `\r` removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or closes before a newline,
    /// or [`Error::Timeout`] if a read timeout is set and expires.
    pub async fn read_line(&mut self) -> Result<String> {
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_raw_line())
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => self.read_raw_line().await,
        }
    }

    async fn read_raw_line(&mut self) -> Result<String> {
        let mut line = Vec::new();

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before end of line",
                )));
            }

            let (consumed, complete) = match buf.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    extend_without_cr(&mut line, &buf[..pos]);
                    (pos + 1, true)
                }
                None => {
                    extend_without_cr(&mut line, buf);
                    (buf.len(), false)
                }
            };
            self.reader.consume(consumed);

            if complete {
                break;
            }
        }

        let text = String::from_utf8_lossy(&line).into_owned();
        trace!(line = %text, "<<");
        Ok(text)
    }

    /// Returns true if received bytes are buffered but not yet read.
    #[must_use]
    pub fn has_buffered_input(&self) -> bool {
        !self.reader.buffer().is_empty()
    }

    /// Shuts down the write half of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.reader.get_mut().shutdown().await?;
        Ok(())
    }
}

fn extend_without_cr(line: &mut Vec<u8>, bytes: &[u8]) {
    line.extend(bytes.iter().copied().filter(|&b| b != b'\r'));
}
