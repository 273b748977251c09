//! Newline-delimited JSON-RPC transport.
//!
//! Framing follows the MCP stdio transport:
//!
//! - one UTF-8 JSON-RPC message per line
//! - messages never contain embedded newlines
//! - stdout carries protocol messages only, logs go to stderr
//!
//! [`Transport`] is generic over any async reader and writer, so tests can
//! drive a server through an in-memory pipe. [`StdioTransport`] is the
//! production instantiation.

use std::io;
use std::string::FromUtf8Error;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Split};

use crate::mcp::protocol::Outgoing;

/// A line-framed JSON-RPC connection.
pub struct Transport<R, W> {
    frames: Split<BufReader<R>>,
    writer: W,
}

/// The transport bound to the process's stdin and stdout.
pub type StdioTransport = Transport<tokio::io::Stdin, tokio::io::Stdout>;

impl StdioTransport {
    /// Attaches to stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps a reader and writer pair.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            frames: BufReader::new(reader).split(b'\n'),
            writer,
        }
    }

    /// Reads the next message line, without its line terminator.
    ///
    /// Returns `None` once the peer closes its end. A line that is not valid
    /// UTF-8 comes back as `Some(Err(_))` so the caller can reject it and
    /// keep reading. Cancelling the returned future loses no data, so it can
    /// sit in a `select!`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying read fails.
    pub async fn read_line(&mut self) -> io::Result<Option<Result<String, FromUtf8Error>>> {
        let Some(mut frame) = self.frames.next_segment().await? else {
            return Ok(None);
        };
        if frame.last() == Some(&b'\r') {
            frame.pop();
        }
        Ok(Some(String::from_utf8(frame)))
    }

    /// Writes one outgoing message.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write(&mut self, message: &Outgoing) -> io::Result<()> {
        self.write_json(message).await
    }

    /// Serialises `value` onto a single line and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}
