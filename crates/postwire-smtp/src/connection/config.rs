//! Connection configuration types.

use std::fmt;
use std::time::Duration;

/// Read, write, connect and handshake timeout applied to every blocking step.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default port for implicit TLS submission.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Default port for plain submission with optional STARTTLS.
pub const SUBMISSION_PORT: u16 = 587;

/// Returns the default port for the given security mode.
#[must_use]
pub const fn default_port(secure: bool) -> u16 {
    if secure {
        IMPLICIT_TLS_PORT
    } else {
        SUBMISSION_PORT
    }
}

/// AUTH LOGIN credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub user: String,
    /// Password.
    pub pass: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Where and how to connect for one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server hostname, also used for TLS identity checks.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Implicit TLS from the first byte. When false, STARTTLS is used if
    /// the server advertises it.
    pub secure: bool,
    /// Credentials for AUTH LOGIN, if any.
    pub credentials: Option<Credentials>,
    /// Timeout for every blocking step.
    pub timeout: Duration,
    /// Name announced in EHLO.
    pub client_name: String,
}

impl ConnectionConfig {
    /// Creates a plain submission configuration on port 587.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self::builder(host).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }
}

/// Builder for connection configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: Option<u16>,
    secure: bool,
    credentials: Option<Credentials>,
    timeout: Duration,
    client_name: String,
}

impl ConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            secure: false,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            client_name: "localhost".to_string(),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enables or disables implicit TLS.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets AUTH LOGIN credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the EHLO client name.
    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host,
            port: self.port.unwrap_or_else(|| default_port(self.secure)),
            secure: self.secure,
            credentials: self.credentials,
            timeout: self.timeout,
            client_name: self.client_name,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(default_port(true), 465);
        assert_eq!(default_port(false), 587);
    }

    #[test]
    fn test_config_new() {
        let config = ConnectionConfig::new("smtp.example.com");
        assert_eq!(config.host, "smtp.example.com");
        assert_eq!(config.port, 587);
        assert!(!config.secure);
        assert!(config.credentials.is_none());
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_config_builder_default_port_follows_secure() {
        let config = ConnectionConfig::builder("smtp.example.com")
            .secure(true)
            .build();
        assert_eq!(config.port, 465);
    }

    #[test]
    fn test_config_builder() {
        let config = ConnectionConfig::builder("smtp.example.com")
            .port(2525)
            .credentials(Credentials::new("user", "pass"))
            .client_name("app.example.com")
            .timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.port, 2525);
        assert_eq!(config.client_name, "app.example.com");
        assert_eq!(config.credentials.unwrap().user, "user");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
