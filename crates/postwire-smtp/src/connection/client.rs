//! Type-state SMTP client.

use std::marker::PhantomData;

use tokio::time::timeout;
use tracing::{debug, warn};

use super::{Channel, ConnectionConfig, Connector, Credentials, SmtpStream};
use super::engine::Connection;
use crate::auth;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::types::{Address, Capabilities, Reply, ReplyCode};

/// Type-state marker: greeting accepted, EHLO and STARTTLS allowed.
#[derive(Debug)]
pub struct Greeted;

/// Type-state marker: authentication settled, ready for MAIL FROM.
#[derive(Debug)]
pub struct Ready;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for at least one accepted recipient.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// SMTP client with type-state pattern.
///
/// Each step consumes the client. When a step fails the client is dropped
/// on the way out, which closes the socket before the error reaches the
/// caller.
#[derive(Debug)]
pub struct Client<State, S = SmtpStream> {
    conn: Connection<S>,
    capabilities: Capabilities,
    _state: PhantomData<State>,
}

impl<S: Channel> Client<Greeted, S> {
    /// Opens a channel with `connector` and reads the greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if connecting times out or fails, or the greeting is
    /// not 220.
    pub async fn connect<C>(connector: &C, config: &ConnectionConfig) -> Result<Self>
    where
        C: Connector<Channel = S>,
    {
        debug!(host = %config.host, port = config.port, secure = config.secure, "connecting");
        let channel = timeout(config.timeout, connector.connect(config))
            .await
            .map_err(|_| Error::Timeout(config.timeout))??;

        Self::from_connection(Connection::new(channel, config.timeout)).await
    }

    /// Reads the server greeting from a freshly opened connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GreetingRejected`] unless the greeting is 220.
    pub async fn from_connection(mut conn: Connection<S>) -> Result<Self> {
        let greeting = conn.send_command(None).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(Error::GreetingRejected {
                code: greeting.code.as_u16(),
                message: greeting.message_text(),
            });
        }

        Ok(Self {
            conn,
            capabilities: Capabilities::default(),
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the advertised capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_name: &str) -> Result<Self> {
        let cmd = Command::Ehlo {
            hostname: client_name.to_string(),
        };
        let reply = self.send_command(&cmd).await?;
        if !reply.is_success() {
            return Err(rejected(&cmd, &reply));
        }

        self.capabilities = Capabilities::from_ehlo(&reply);
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// Capabilities may change once the channel is encrypted, so the
    /// pre-TLS list is discarded and replaced by the new EHLO reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StartTlsRejected`] unless the server answers 220, or
    /// an error from the handshake or the second EHLO.
    pub async fn starttls(mut self, hostname: &str, client_name: &str) -> Result<Self> {
        if self.conn.is_encrypted() {
            return Err(Error::InvalidState("Already using TLS".into()));
        }

        let reply = self.send_command(&Command::StartTls).await?;
        if reply.code != ReplyCode::SERVICE_READY {
            return Err(Error::StartTlsRejected {
                code: reply.code.as_u16(),
                message: reply.message_text(),
            });
        }

        let conn = self.conn.upgrade_to_tls(hostname).await?;
        debug!(%hostname, "TLS established");

        let client = Self {
            conn,
            capabilities: Capabilities::default(),
            _state: PhantomData,
        };
        client.ehlo(client_name).await
    }

    /// Runs AUTH LOGIN when credentials are given; a no-op otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthFailed`] if the server rejects a step.
    pub async fn authenticate(
        mut self,
        credentials: Option<&Credentials>,
    ) -> Result<Client<Ready, S>> {
        if credentials.is_some() {
            let mechanisms = self.capabilities.auth_mechanisms();
            debug!(?mechanisms, "server AUTH mechanisms");
            if !mechanisms.contains(&"LOGIN") {
                warn!("AUTH LOGIN not advertised, trying it anyway");
            }
        }
        auth::authenticate(&mut self.conn, credentials).await?;
        Ok(self.transition())
    }
}

impl<S: Channel> Client<Ready, S> {
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 250.
    pub async fn mail_from(mut self, from: Address) -> Result<Client<MailTransaction, S>> {
        let cmd = Command::MailFrom { from };
        let reply = self.send_command(&cmd).await?;
        if reply.code != ReplyCode::OK {
            return Err(rejected(&cmd, &reply));
        }

        Ok(self.transition())
    }
}

impl<S: Channel> Client<MailTransaction, S> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 250 or 251.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded, S>> {
        self.add_recipient(to).await?;
        Ok(self.transition())
    }
}

impl<S: Channel> Client<RecipientAdded, S> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 250 or 251.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.add_recipient(to).await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 354.
    pub async fn data(mut self) -> Result<Client<Data, S>> {
        let cmd = Command::Data;
        let reply = self.send_command(&cmd).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(rejected(&cmd, &reply));
        }

        Ok(self.transition())
    }
}

impl<S: Channel> Client<Data, S> {
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, lines starting with `.` are
    /// dot-stuffed and the terminating `.` line is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails or the server does not answer 250.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Ready, S>> {
        self.conn.write_all(&encode_data(message)).await?;

        let reply = self.conn.read_reply().await?;
        debug!(code = reply.code.as_u16(), text = %reply.message_text(), "S:");
        if reply.code != ReplyCode::OK {
            return Err(Error::CommandRejected {
                verb: "DATA",
                code: reply.code.as_u16(),
                message: reply.message_text(),
            });
        }

        Ok(self.transition())
    }
}

// Common implementation for all states
impl<State, S: Channel> Client<State, S> {
    /// Returns the capabilities from the most recent EHLO.
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns true if the channel is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.conn.is_encrypted()
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// A reply other than 221 is only logged: by now the outcome of the send
    /// is known.
    pub async fn quit(mut self) {
        match self.send_command(&Command::Quit).await {
            Ok(reply) if reply.code != ReplyCode::CLOSING => {
                debug!(code = reply.code.as_u16(), "unexpected QUIT reply");
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "QUIT failed"),
        }
        self.conn.shutdown().await;
    }

    async fn send_command(&mut self, cmd: &Command) -> Result<Reply> {
        self.conn.send_command(Some(cmd)).await
    }

    async fn add_recipient(&mut self, to: Address) -> Result<()> {
        let cmd = Command::RcptTo { to };
        let reply = self.send_command(&cmd).await?;
        if !reply.is_one_of(&[ReplyCode::OK, ReplyCode::FORWARD]) {
            return Err(rejected(&cmd, &reply));
        }
        Ok(())
    }

    fn transition<Next>(self) -> Client<Next, S> {
        Client {
            conn: self.conn,
            capabilities: self.capabilities,
            _state: PhantomData,
        }
    }
}

fn rejected(cmd: &Command, reply: &Reply) -> Error {
    Error::CommandRejected {
        verb: cmd.verb(),
        code: reply.code.as_u16(),
        message: reply.message_text(),
    }
}

/// Prepares a message for the DATA phase.
///
/// Bare LF becomes CRLF, lines beginning with `.` get an extra `.`, and the
/// `.` end-of-data line is appended.
#[must_use]
pub fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + message.len() / 32 + 5);
    let body = message.strip_suffix(b"\n").unwrap_or(message);

    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_data_terminates() {
        assert_eq!(encode_data(b"Subject: hi\r\n\r\nbody\r\n"), b"Subject: hi\r\n\r\nbody\r\n.\r\n");
    }

    #[test]
    fn test_encode_data_normalizes_bare_lf() {
        assert_eq!(encode_data(b"a\nb"), b"a\r\nb\r\n.\r\n");
    }

    #[test]
    fn test_encode_data_dot_stuffing() {
        assert_eq!(encode_data(b"line\r\n.\r\n..x"), b"line\r\n..\r\n...x\r\n.\r\n");
    }

    #[test]
    fn test_encode_data_keeps_trailing_blank_line() {
        assert_eq!(encode_data(b"--b--\r\n\r\n"), b"--b--\r\n\r\n.\r\n");
    }
}
