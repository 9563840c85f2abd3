//! Error types for SMTP operations.

use std::fmt;
use std::io;
use std::time::Duration;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Step of the AUTH LOGIN exchange that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    /// The `AUTH LOGIN` command itself.
    Init,
    /// The base64 username line.
    Username,
    /// The base64 password line.
    Password,
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("AUTH LOGIN"),
            Self::Username => f.write_str("AUTH username"),
            Self::Password => f.write_str("AUTH password"),
        }
    }
}

/// SMTP send failures.
///
/// Every variant is fatal to the current send. Variants produced by a server
/// reply carry the reply code so operators can tell an authentication
/// rejection from a rejected recipient.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the socket, including TLS handshake failures.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configured host is not a valid TLS server name.
    #[error("Invalid TLS server name: {0}")]
    InvalidDnsName(String),

    /// No progress within the socket timeout.
    #[error("SMTP connection timed out after {0:?}")]
    Timeout(Duration),

    /// The peer closed the connection before a complete reply arrived.
    #[error("SMTP connection closed unexpectedly")]
    ConnectionClosed,

    /// The server greeting was not 220.
    #[error("SMTP server rejected the connection (code {code}): {message}")]
    GreetingRejected {
        /// Reply code.
        code: u16,
        /// Reply text.
        message: String,
    },

    /// STARTTLS was answered with something other than 220.
    #[error("STARTTLS failed (code {code}): {message}")]
    StartTlsRejected {
        /// Reply code.
        code: u16,
        /// Reply text.
        message: String,
    },

    /// A step of AUTH LOGIN was rejected.
    #[error("{stage} failed (code {code}): {message}")]
    AuthFailed {
        /// Which step was rejected.
        stage: AuthStage,
        /// Reply code.
        code: u16,
        /// Reply text.
        message: String,
    },

    /// A transaction command got an unexpected reply.
    #[error("{verb} failed (code {code}): {message}")]
    CommandRejected {
        /// Command verb, e.g. `RCPT TO`.
        verb: &'static str,
        /// Reply code.
        code: u16,
        /// Reply text.
        message: String,
    },

    /// The message has no recipients after normalization.
    #[error("Message must have at least one recipient")]
    NoRecipients,

    /// The From value does not reduce to a bare address.
    #[error("Sender must contain a valid address: {0:?}")]
    BadFromAddress(String),

    /// An envelope address cannot be written to the wire.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Malformed reply from the server.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation not valid in the current connection state.
    #[error("Invalid state for operation: {0}")]
    InvalidState(String),
}

impl Error {
    /// Returns the server reply code behind this error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::GreetingRejected { code, .. }
            | Self::StartTlsRejected { code, .. }
            | Self::AuthFailed { code, .. }
            | Self::CommandRejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if the server answered with a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self.code(), Some(code) if code >= 500 && code < 600)
    }

    /// Returns true if the server answered with a transient error (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.code(), Some(code) if code >= 400 && code < 500)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn message_embeds_code() {
        let err = Error::CommandRejected {
            verb: "RCPT TO",
            code: 550,
            message: "No such user".into(),
        };
        assert_eq!(err.to_string(), "RCPT TO failed (code 550): No such user");
        assert!(err.is_permanent());
        assert!(!err.is_transient());
    }

    #[test]
    fn auth_stage_in_message() {
        let err = Error::AuthFailed {
            stage: AuthStage::Password,
            code: 535,
            message: "Bad credentials".into(),
        };
        assert!(err.to_string().starts_with("AUTH password failed (code 535)"));
        assert_eq!(err.code(), Some(535));
    }

    #[test]
    fn transport_errors_have_no_code() {
        assert_eq!(Error::ConnectionClosed.code(), None);
        assert_eq!(Error::Timeout(Duration::from_secs(15)).code(), None);
        assert!(!Error::NoRecipients.is_permanent());
    }

    #[test]
    fn transient_greeting() {
        let err = Error::GreetingRejected {
            code: 421,
            message: "Try later".into(),
        };
        assert!(err.is_transient());
    }
}
