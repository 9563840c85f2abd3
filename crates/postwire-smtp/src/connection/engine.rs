//! Command/response engine.
//!
//! One command in, one complete reply out. Every socket operation is bounded
//! by the connection timeout; the engine never retries.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::debug;

use super::Channel;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::ReplyParser;
use crate::types::Reply;

/// Size of a single socket read.
const READ_CHUNK_SIZE: usize = 4096;

/// A channel plus the reply framing state for it.
#[derive(Debug)]
pub struct Connection<S> {
    channel: S,
    parser: ReplyParser,
    timeout: Duration,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an open channel.
    pub fn new(channel: S, timeout: Duration) -> Self {
        Self {
            channel,
            parser: ReplyParser::new(),
            timeout,
        }
    }

    /// Returns the timeout applied to each blocking step.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Writes `command` (if any) and waits for one complete reply.
    ///
    /// Passing `None` only reads, which is how the greeting is collected.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, I/O failure, early close or a malformed
    /// reply.
    pub async fn send_command(&mut self, command: Option<&Command>) -> Result<Reply> {
        if let Some(command) = command {
            debug!(?command, "C:");
            self.write_all(&command.serialize()).await?;
        }

        let reply = self.read_reply().await?;
        debug!(code = reply.code.as_u16(), text = %reply.message_text(), "S:");
        Ok(reply)
    }

    /// Reads the next complete reply.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, I/O failure, early close or a malformed
    /// reply.
    pub async fn read_reply(&mut self) -> Result<Reply> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(reply) = self.parser.next_reply()? {
                return Ok(reply);
            }

            let read = timeout(self.timeout, self.channel.read(&mut chunk))
                .await
                .map_err(|_| Error::Timeout(self.timeout))??;

            if read == 0 {
                return Err(Error::ConnectionClosed);
            }
            self.parser.feed(&chunk[..read]);
        }
    }

    /// Writes raw bytes and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or I/O failure.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let channel = &mut self.channel;
        timeout(self.timeout, async move {
            channel.write_all(data).await?;
            channel.flush().await
        })
        .await
        .map_err(|_| Error::Timeout(self.timeout))??;
        Ok(())
    }

    /// Shuts the write side down, ignoring failures.
    pub async fn shutdown(&mut self) {
        match timeout(self.timeout, self.channel.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "shutdown failed"),
            Err(_) => debug!("shutdown timed out"),
        }
    }

    /// Returns the underlying channel.
    pub const fn get_ref(&self) -> &S {
        &self.channel
    }
}

impl<S: Channel> Connection<S> {
    /// Returns true if the channel is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.channel.is_encrypted()
    }

    /// Upgrades the channel to TLS in place.
    ///
    /// Anything the server sent after its STARTTLS go-ahead and before the
    /// handshake is discarded, never read as a post-TLS reply.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or handshake failure.
    pub async fn upgrade_to_tls(mut self, hostname: &str) -> Result<Self> {
        if self.parser.has_buffered() {
            debug!("discarding plaintext received before TLS handshake");
            self.parser.clear();
        }

        let channel = timeout(self.timeout, self.channel.upgrade_to_tls(hostname))
            .await
            .map_err(|_| Error::Timeout(self.timeout))??;

        Ok(Self {
            channel,
            parser: ReplyParser::new(),
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ReplyCode;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn reads_greeting_without_writing() {
        let mock = Builder::new().read(b"220 mx.example.com ESMTP\r\n").build();
        let mut conn = Connection::new(mock, Duration::from_secs(15));

        let reply = conn.send_command(None).await.unwrap();
        assert_eq!(reply.code, ReplyCode::SERVICE_READY);
    }

    #[tokio::test]
    async fn writes_command_then_reads_multiline_reply() {
        let mock = Builder::new()
            .write(b"EHLO client.test\r\n")
            .read(b"250-mx.example.com\r\n250-")
            .read(b"PIPELINING\r\n")
            .read(b"250 STARTTLS\r\n")
            .build();
        let mut conn = Connection::new(mock, Duration::from_secs(15));

        let reply = conn
            .send_command(Some(&Command::Ehlo {
                hostname: "client.test".into(),
            }))
            .await
            .unwrap();
        assert_eq!(reply.code, ReplyCode::OK);
        assert_eq!(reply.lines, vec!["mx.example.com", "PIPELINING", "STARTTLS"]);
    }

    #[tokio::test]
    async fn early_close_is_reported() {
        let mock = Builder::new().read(b"220-partial\r\n").build();
        let mut conn = Connection::new(mock, Duration::from_secs(15));

        let err = conn.send_command(None).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_server_times_out() {
        let mock = Builder::new()
            .write(b"DATA\r\n")
            .wait(Duration::from_secs(60))
            .build();
        let mut conn = Connection::new(mock, Duration::from_secs(15));

        let err = conn.send_command(Some(&Command::Data)).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_secs(15)));
    }
}
