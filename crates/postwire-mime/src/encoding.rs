//! Header value encoding.
//!
//! Base64 and the RFC 2047 "B" encoded-word used for non-ASCII subjects.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes a subject for the `Subject` header.
///
/// Pure ASCII subjects are returned verbatim. Anything else becomes a single
/// UTF-8 base64 encoded word: `=?UTF-8?B?...?=`.
///
/// ```
/// use postwire_mime::encoding::encode_subject;
///
/// assert_eq!(encode_subject("Hello"), "Hello");
/// assert_eq!(encode_subject("Tere, õpetaja"), "=?UTF-8?B?VGVyZSwgw7VwZXRhamE=?=");
/// ```
#[must_use]
pub fn encode_subject(subject: &str) -> String {
    if subject.is_ascii() {
        return subject.to_string();
    }

    format!("=?UTF-8?B?{}?=", encode_base64(subject.as_bytes()))
}
