//! Transports: SMTP delivery and the logging mock.

use std::future::Future;

use postwire_mime::OutboundMessage;
use postwire_smtp::{ConnectionConfig, Connector, TcpConnector};
use tracing::{info, warn};

use crate::config::{Resolution, Settings};
use crate::dispatch::send_mail;
use crate::error::{ConfigError, Result};

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The encoded payload (SMTP) or the serialized message (mock).
    pub message: String,
}

/// Something that can send an [`OutboundMessage`].
pub trait Transport: Send + Sync {
    /// Sends one message.
    fn send(&self, message: &OutboundMessage) -> impl Future<Output = Result<Receipt>> + Send;
}

/// Delivers over SMTP, one connection per message.
#[derive(Debug, Clone)]
pub struct SmtpTransport<C = TcpConnector> {
    config: ConnectionConfig,
    connector: C,
}

impl SmtpTransport {
    /// Creates a transport that connects over TCP.
    #[must_use]
    pub const fn new(config: ConnectionConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> SmtpTransport<C> {
    /// Creates a transport that opens channels with `connector`.
    pub const fn with_connector(config: ConnectionConfig, connector: C) -> Self {
        Self { config, connector }
    }

    /// Returns the connection configuration.
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl<C: Connector> Transport for SmtpTransport<C> {
    async fn send(&self, message: &OutboundMessage) -> Result<Receipt> {
        match send_mail(&self.connector, &self.config, message).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                warn!(host = %self.config.host, error = %e, "send failed");
                Err(e.into())
            }
        }
    }
}

/// Logs messages instead of sending them. Never fails.
#[derive(Debug, Clone)]
pub struct MockTransport {
    tag: String,
}

impl MockTransport {
    /// Creates a mock transport whose log lines carry `tag`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Returns the log tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new("mailer")
    }
}

impl Transport for MockTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<Receipt> {
        let serialized =
            serde_json::to_string_pretty(message).unwrap_or_else(|_| format!("{message:#?}"));
        info!(tag = %self.tag, message = %serialized, "mock email message");
        Ok(Receipt {
            message: serialized,
        })
    }
}

/// The transport chosen from the settings.
#[derive(Debug, Clone)]
pub enum Mailer {
    /// SMTP delivery.
    Smtp(SmtpTransport),
    /// Logging mock.
    Mock(MockTransport),
}

impl Mailer {
    /// Builds the transport described by `settings`.
    ///
    /// Falls back to the mock when nothing is configured, with a warning in
    /// production.
    ///
    /// # Errors
    ///
    /// Returns the configuration error for a malformed connection string.
    pub fn from_settings(settings: &Settings, tag: &str) -> std::result::Result<Self, ConfigError> {
        match settings.resolve()? {
            Resolution::Smtp(config) => {
                info!(
                    tag,
                    host = %config.host,
                    port = config.port,
                    secure = config.secure,
                    "using SMTP transport"
                );
                Ok(Self::Smtp(SmtpTransport::new(config)))
            }
            Resolution::Mock => {
                if settings.environment.is_production() {
                    warn!(
                        tag,
                        "no email transport configured, set EMAIL_SERVER or SMTP_* variables; messages will only be logged"
                    );
                }
                Ok(Self::Mock(MockTransport::new(tag)))
            }
        }
    }

    /// Returns true for the mock transport.
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        matches!(self, Self::Mock(_))
    }
}

impl Transport for Mailer {
    async fn send(&self, message: &OutboundMessage) -> Result<Receipt> {
        match self {
            Self::Smtp(t) => t.send(message).await,
            Self::Mock(t) => t.send(message).await,
        }
    }
}
