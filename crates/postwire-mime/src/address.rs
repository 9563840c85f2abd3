//! Recipient lists and address extraction.

use std::fmt;

/// One or many recipients, as written by the caller.
///
/// Entries may carry display names (`Ada <ada@example.com>`) and a single
/// entry may itself be a comma-separated list. Lists may nest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Recipients {
    /// A single entry, possibly comma-separated.
    One(String),
    /// A list of entries.
    Many(Vec<Recipients>),
}

impl Recipients {
    /// Flattens into trimmed, non-empty addresses.
    #[must_use]
    pub fn normalize(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    /// Returns true if normalization yields no address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(value) => value.split(',').all(|p| p.trim().is_empty()),
            Self::Many(items) => items.iter().all(Self::is_empty),
        }
    }

    fn collect_into(&self, out: &mut Vec<String>) {
        match self {
            Self::One(value) => out.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            ),
            Self::Many(items) => {
                for item in items {
                    item.collect_into(out);
                }
            }
        }
    }
}

impl Default for Recipients {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Header form: list entries joined with `", "`, single entries verbatim.
impl fmt::Display for Recipients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(value) => f.write_str(value),
            Self::Many(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Recipients {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for Recipients {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values.into_iter().map(Self::One).collect())
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(Self::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(values: [&str; N]) -> Self {
        Self::Many(values.into_iter().map(Self::from).collect())
    }
}

impl From<Option<Self>> for Recipients {
    fn from(value: Option<Self>) -> Self {
        value.unwrap_or_default()
    }
}

/// Flattens `to` into a list of trimmed addresses.
///
/// Nested lists are walked depth-first and every entry is split on commas.
/// Empty input yields an empty list.
#[must_use]
pub fn normalize_recipients(to: &Recipients) -> Vec<String> {
    to.normalize()
}

/// Reduces a mailbox to its bare address.
///
/// Returns the text between the first `<` and the following `>` when such a
/// pair encloses something, otherwise the trimmed input.
///
/// ```
/// use postwire_mime::extract_address;
///
/// assert_eq!(extract_address("Ada <ada@example.com>"), "ada@example.com");
/// assert_eq!(extract_address("  ada@example.com "), "ada@example.com");
/// ```
#[must_use]
pub fn extract_address(value: &str) -> String {
    value
        .split_once('<')
        .and_then(|(_, rest)| rest.split_once('>'))
        .map(|(inner, _)| inner)
        .filter(|inner| !inner.is_empty())
        .map_or_else(|| value.trim().to_string(), |inner| inner.trim().to_string())
}

/// Domain part of a mailbox, used to qualify Message-IDs.
pub(crate) fn domain_of(mailbox: &str) -> Option<String> {
    let bare = extract_address(mailbox);
    let (_, domain) = bare.rsplit_once('@')?;
    let domain = domain.trim();
    (!domain.is_empty()).then(|| domain.to_string())
}
