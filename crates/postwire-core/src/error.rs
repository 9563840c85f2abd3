//! Error types for the core library.

use thiserror::Error;

/// Errors in the mail configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `EMAIL_SERVER` could not be parsed as a URL.
    #[error("Malformed EMAIL_SERVER connection string: {0}")]
    MalformedUrl(#[from] url::ParseError),

    /// `EMAIL_SERVER` uses a scheme other than smtp, smtps or smtp+ssl.
    #[error("Unsupported EMAIL_SERVER scheme: {0}")]
    UnsupportedScheme(String),

    /// `EMAIL_SERVER` has no host.
    #[error("EMAIL_SERVER has no host")]
    MissingHost,

    /// A port value is not a number in 1..=65535.
    #[error("Invalid SMTP port: {0}")]
    InvalidPort(String),

    /// Userinfo in `EMAIL_SERVER` is not valid percent-encoded UTF-8.
    #[error("EMAIL_SERVER credentials are not valid UTF-8")]
    InvalidCredentials,

    /// A numeric setting is not a positive integer.
    #[error("Invalid {name}: {value}")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// The value as read.
        value: String,
    },

    /// Neither `EMAIL_FROM` nor `SMTP_FROM` is set.
    #[error("No sender configured, set EMAIL_FROM or SMTP_FROM")]
    MissingSender,

    /// No public base URL for links.
    #[error("No base URL configured for links, set NEXTAUTH_URL, AUTH_URL, APP_URL or VERCEL_URL")]
    MissingBaseUrl,
}

/// Errors from sending mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The SMTP exchange failed.
    #[error(transparent)]
    Smtp(#[from] postwire_smtp::Error),
}

impl MailError {
    /// Returns the SMTP status code that caused the failure, if any.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::Smtp(e) => e.code(),
            Self::Config(_) => None,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, MailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_passes_through() {
        let err = MailError::from(postwire_smtp::Error::GreetingRejected {
            code: 554,
            message: "go away".into(),
        });
        assert_eq!(err.code(), Some(554));
        assert!(err.to_string().contains("554"));

        let err = MailError::from(ConfigError::MissingSender);
        assert_eq!(err.code(), None);
        assert!(err.to_string().contains("EMAIL_FROM"));
    }
}
