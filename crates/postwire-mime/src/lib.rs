//! # postwire-mime
//!
//! Outbound message model and multipart/alternative encoding.
//!
//! ## Features
//!
//! - **Recipients**: one-or-many recipient lists, flattened and split on
//!   commas ([`normalize_recipients`]), bare address extraction
//!   ([`extract_address`])
//! - **Alternatives**: every message carries both a plain and an HTML part;
//!   the missing one is synthesized
//! - **Headers**: RFC 2047 encoded non-ASCII subjects, line breaks folded out
//!   of caller-supplied values
//! - **Serde**: optional `serde` feature for [`OutboundMessage`]
//!
//! ## Quick Start
//!
//! ```
//! use postwire_mime::{OutboundMessage, build_mime_message};
//!
//! let message = OutboundMessage::new(
//!     "Support <support@example.com>",
//!     ["ada@example.com", "bob@example.com"],
//!     "Your code",
//! )
//! .with_text("123456");
//!
//! let payload = build_mime_message(&message);
//! assert!(payload.contains("To: ada@example.com, bob@example.com\r\n"));
//! assert!(payload.contains("<pre>123456</pre>"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod header;
mod message;

pub mod encoding;
pub mod html;

pub use address::{Recipients, extract_address, normalize_recipients};
pub use header::{Headers, fold_line_breaks};
pub use message::{OutboundMessage, Stamp, build_mime_message, encode_with, generate_boundary};
