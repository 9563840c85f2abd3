//! Outbound message model and the multipart/alternative encoder.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::address::{Recipients, domain_of};
use crate::encoding::encode_subject;
use crate::header::{Headers, fold_line_breaks};
use crate::html::{html_to_text, text_to_html};

/// Prefix of every generated boundary.
const BOUNDARY_PREFIX: &str = "postwire-";

/// Domain used in Message-IDs when the sender has none.
const FALLBACK_DOMAIN: &str = "localhost";

/// A message as requested by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutboundMessage {
    /// Sender mailbox, optionally with a display name.
    pub from: String,
    /// Recipients.
    pub to: Recipients,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub text: Option<String>,
    /// HTML body.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub html: Option<String>,
}

impl OutboundMessage {
    /// Creates a message without a body.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<Recipients>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            text: None,
            html: None,
        }
    }

    /// Sets the plain text body.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Returns both alternatives, synthesizing whichever is missing.
    ///
    /// Text alone gets an escaped `<pre>` HTML part; HTML alone gets a plain
    /// part with tags stripped and whitespace collapsed. Empty bodies count
    /// as missing.
    #[must_use]
    pub fn alternatives(&self) -> (String, String) {
        let text = self.text.as_deref().filter(|t| !t.is_empty());
        let html = self.html.as_deref().filter(|h| !h.is_empty());

        let plain = match (text, html) {
            (Some(text), _) => text.to_string(),
            (None, Some(html)) => html_to_text(html),
            (None, None) => String::new(),
        };
        let html = match (html, text) {
            (Some(html), _) => html.to_string(),
            (None, Some(text)) => text_to_html(text),
            (None, None) => plain.clone(),
        };

        (plain, html)
    }
}

/// Per-send values that differ between two encodings of the same message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// Multipart boundary.
    pub boundary: String,
    /// Value of the `Date` header.
    pub date: DateTime<Utc>,
    /// Value of the `Message-ID` header, angle brackets included.
    pub message_id: String,
}

impl Stamp {
    /// Generates a fresh stamp for a message sent by `from`.
    #[must_use]
    pub fn generate(from: &str) -> Self {
        let date = Utc::now();
        let domain = domain_of(from).unwrap_or_else(|| FALLBACK_DOMAIN.to_string());
        let message_id = format!(
            "<{}.{:x}@{domain}>",
            date.timestamp_millis(),
            rand::random::<u64>()
        );

        Self {
            boundary: generate_boundary(),
            date,
            message_id,
        }
    }
}

/// Generates `postwire-` followed by 24 random hex digits.
#[must_use]
pub fn generate_boundary() -> String {
    let bytes: [u8; 12] = rand::random();
    let mut boundary = String::with_capacity(BOUNDARY_PREFIX.len() + 24);
    boundary.push_str(BOUNDARY_PREFIX);
    for b in bytes {
        let _ = write!(boundary, "{b:02x}");
    }
    boundary
}

/// Encodes `message` as a CRLF-joined multipart/alternative document.
///
/// Every call uses a fresh boundary, Date and Message-ID.
#[must_use]
pub fn build_mime_message(message: &OutboundMessage) -> String {
    encode_with(message, Stamp::generate(&message.from))
}

/// Encodes `message` using the given stamp.
///
/// If either body contains the stamp's boundary, a new boundary is drawn
/// until it no longer collides.
#[must_use]
pub fn encode_with(message: &OutboundMessage, mut stamp: Stamp) -> String {
    let (plain, html) = message.alternatives();
    while plain.contains(&stamp.boundary) || html.contains(&stamp.boundary) {
        stamp.boundary = generate_boundary();
    }
    let boundary = &stamp.boundary;

    let mut headers = Headers::new();
    headers.add("From", &message.from);
    headers.add("To", message.to.to_string());
    headers.add("Subject", encode_subject(&fold_line_breaks(&message.subject)));
    headers.add("Date", stamp.date.to_rfc2822());
    headers.add("Message-ID", &stamp.message_id);
    headers.add("MIME-Version", "1.0");
    headers.add(
        "Content-Type",
        format!("multipart/alternative; boundary=\"{boundary}\""),
    );

    let parts = [
        format!("--{boundary}"),
        "Content-Type: text/plain; charset=utf-8".to_string(),
        "Content-Transfer-Encoding: 8bit".to_string(),
        String::new(),
        plain,
        format!("--{boundary}"),
        "Content-Type: text/html; charset=utf-8".to_string(),
        "Content-Transfer-Encoding: 8bit".to_string(),
        String::new(),
        html,
        format!("--{boundary}--"),
        String::new(),
    ];

    format!("{headers}\r\n{}", parts.join("\r\n"))
}
