//! EHLO capability list.

use super::Reply;

/// Capabilities advertised in an EHLO reply.
///
/// Every reply line after the first, trimmed and uppercased. Membership is
/// literal: `AUTH LOGIN PLAIN` is one capability string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    keywords: Vec<String>,
}

impl Capabilities {
    /// Extracts capabilities from an EHLO reply.
    #[must_use]
    pub fn from_ehlo(reply: &Reply) -> Self {
        let keywords = reply
            .lines
            .iter()
            .skip(1)
            .map(|line| line.trim().to_uppercase())
            .filter(|line| !line.is_empty())
            .collect();
        Self { keywords }
    }

    /// Checks literal membership of a capability string.
    #[must_use]
    pub fn contains(&self, capability: &str) -> bool {
        let wanted = capability.trim().to_uppercase();
        self.keywords.iter().any(|k| *k == wanted)
    }

    /// Checks if STARTTLS is advertised.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.contains("STARTTLS")
    }

    /// Returns the mechanisms listed on the `AUTH` line, if any.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .find_map(|k| k.strip_prefix("AUTH "))
            .map(|rest| rest.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Returns the capability strings in advertised order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Returns true if nothing was advertised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ReplyCode;

    fn ehlo(lines: &[&str]) -> Reply {
        Reply::new(
            ReplyCode::OK,
            lines.iter().map(ToString::to_string).collect(),
        )
    }

    #[test]
    fn skips_greeting_line() {
        let caps = Capabilities::from_ehlo(&ehlo(&["smtp.example.com Hello", "PIPELINING"]));
        assert_eq!(caps.iter().collect::<Vec<_>>(), vec!["PIPELINING"]);
        assert!(!caps.contains("SMTP.EXAMPLE.COM HELLO"));
    }

    #[test]
    fn starttls_is_case_insensitive_and_trimmed() {
        let caps = Capabilities::from_ehlo(&ehlo(&["mx", " starttls "]));
        assert!(caps.supports_starttls());
    }

    #[test]
    fn starttls_membership_is_literal() {
        let caps = Capabilities::from_ehlo(&ehlo(&["mx", "X-STARTTLS-LIKE"]));
        assert!(!caps.supports_starttls());
    }

    #[test]
    fn single_line_ehlo_has_no_capabilities() {
        let caps = Capabilities::from_ehlo(&ehlo(&["mx greets you"]));
        assert!(caps.is_empty());
    }

    #[test]
    fn auth_mechanisms() {
        let caps = Capabilities::from_ehlo(&ehlo(&["mx", "SIZE 1000", "AUTH login PLAIN"]));
        assert_eq!(caps.auth_mechanisms(), vec!["LOGIN", "PLAIN"]);
        assert!(caps.contains("auth login plain"));
    }
}
