//! Envelope address type.

use crate::error::{Error, Result};

/// Bare address used in `MAIL FROM` and `RCPT TO`.
///
/// Display names and angle brackets must already be stripped. The value is
/// written verbatim between `<` and `>`, so anything that could break out of
/// the path or the command line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new envelope address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty or contains whitespace,
    /// control characters or angle brackets.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        if let Some(bad) = addr
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || *c == '<' || *c == '>')
        {
            return Err(Error::InvalidAddress(format!(
                "{addr:?} contains forbidden character {bad:?}"
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
