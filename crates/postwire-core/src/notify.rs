//! Notification emails: password reset, one-time login codes and email
//! address verification.

use postwire_mime::OutboundMessage;
use postwire_mime::html::escape;
use tracing::{Instrument, info_span};
use url::form_urlencoded;

use crate::error::Result;
use crate::transport::{Receipt, Transport};

/// Default validity of a one-time code, in minutes.
pub const DEFAULT_CODE_VALIDITY_MINUTES: u32 = 10;

/// Builds the reset link for `token` under `base_url`.
///
/// ```
/// use postwire_core::notify::password_reset_link;
///
/// assert_eq!(
///     password_reset_link("https://app.example.com/", "abc123"),
///     "https://app.example.com/reset-password/abc123"
/// );
/// ```
#[must_use]
pub fn password_reset_link(base_url: &str, token: &str) -> String {
    format!("{}/reset-password/{token}", base_url.trim_end_matches('/'))
}

/// Builds the email verification link for `email` under `base_url`. Both
/// query values are form-encoded.
///
/// ```
/// use postwire_core::notify::email_verification_link;
///
/// assert_eq!(
///     email_verification_link("https://app.example.com/", "ada+test@example.com", "t0k"),
///     "https://app.example.com/api/verify-email?email=ada%2Btest%40example.com&token=t0k"
/// );
/// ```
#[must_use]
pub fn email_verification_link(base_url: &str, email: &str, token: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("email", email)
        .append_pair("token", token)
        .finish();
    format!(
        "{}/api/verify-email?{query}",
        base_url.trim_end_matches('/')
    )
}

/// Builds the password reset email.
#[must_use]
pub fn password_reset_message(from: &str, to: &str, link: &str) -> OutboundMessage {
    let text = format!(
        "Hello,\n\nYou can reset your password using this link:\n{link}\n\n\
         If you did not ask for a password reset, you can ignore this email."
    );
    let link = escape(link);
    let html = format!(
        "<p>Hello,</p>\n\
         <p>You can reset your password using this link:</p>\n\
         <p><a href=\"{link}\">{link}</a></p>\n\
         <p>If you did not ask for a password reset, you can ignore this email.</p>"
    );

    OutboundMessage::new(from, to, "Reset your password")
        .with_text(text)
        .with_html(html)
}

/// Builds the one-time login code email.
#[must_use]
pub fn one_time_code_message(
    from: &str,
    to: &str,
    code: &str,
    valid_minutes: u32,
) -> OutboundMessage {
    let text = format!(
        "Hello,\n\nYour verification code is: {code}\nThe code is valid for {valid_minutes} minutes.\n\n\
         If you did not try to sign in, let us know as soon as possible."
    );
    let code = escape(code);
    let html = format!(
        "<p>Hello,</p>\n\
         <p>Your verification code is: <strong>{code}</strong></p>\n\
         <p>The code is valid for {valid_minutes} minutes.</p>\n\
         <p>If you did not try to sign in, let us know as soon as possible.</p>"
    );

    OutboundMessage::new(from, to, "Your sign-in code")
        .with_text(text)
        .with_html(html)
}

/// Builds the email verification message.
#[must_use]
pub fn email_verification_message(
    from: &str,
    to: &str,
    link: &str,
    valid_hours: u32,
) -> OutboundMessage {
    let text = format!(
        "Hello,\n\nPlease confirm your email address using this link:\n{link}\n\
         The link is valid for {valid_hours} hours.\n\n\
         If you did not create an account, you can ignore this email."
    );
    let link = escape(link);
    let html = format!(
        "<p>Hello,</p>\n\
         <p>Please confirm your email address using this link:</p>\n\
         <p><a href=\"{link}\">{link}</a></p>\n\
         <p>The link is valid for {valid_hours} hours.</p>\n\
         <p>If you did not create an account, you can ignore this email.</p>"
    );

    OutboundMessage::new(from, to, "Confirm your email address")
        .with_text(text)
        .with_html(html)
}

/// Sends a password reset email.
///
/// # Errors
///
/// Returns the transport error.
pub async fn send_password_reset<T: Transport>(
    transport: &T,
    from: &str,
    to: &str,
    link: &str,
) -> Result<Receipt> {
    let message = password_reset_message(from, to, link);
    transport
        .send(&message)
        .instrument(info_span!("notify", kind = "password-reset"))
        .await
}

/// Sends a one-time login code.
///
/// # Errors
///
/// Returns the transport error.
pub async fn send_one_time_code<T: Transport>(
    transport: &T,
    from: &str,
    to: &str,
    code: &str,
    valid_minutes: u32,
) -> Result<Receipt> {
    let message = one_time_code_message(from, to, code, valid_minutes);
    transport
        .send(&message)
        .instrument(info_span!("notify", kind = "login-otp"))
        .await
}

/// Sends an email verification link.
///
/// # Errors
///
/// Returns the transport error.
pub async fn send_email_verification<T: Transport>(
    transport: &T,
    from: &str,
    to: &str,
    link: &str,
    valid_hours: u32,
) -> Result<Receipt> {
    let message = email_verification_message(from, to, link, valid_hours);
    transport
        .send(&message)
        .instrument(info_span!("notify", kind = "email-verify"))
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_reset_link_trims_slash() {
        assert_eq!(
            password_reset_link("http://localhost:3000", "t"),
            "http://localhost:3000/reset-password/t"
        );
        assert_eq!(
            password_reset_link("https://x.example//", "t"),
            "https://x.example/reset-password/t"
        );
    }

    #[test]
    fn test_password_reset_message() {
        let message = password_reset_message(
            "Support <support@example.com>",
            "ada@example.com",
            "https://app.example.com/reset-password/abc?x=1&y=2",
        );
        assert_eq!(message.subject, "Reset your password");
        assert!(
            message
                .text
                .as_deref()
                .unwrap()
                .contains("https://app.example.com/reset-password/abc?x=1&y=2")
        );
        assert!(message.html.as_deref().unwrap().contains("abc?x=1&amp;y=2"));
    }

    #[test]
    fn test_one_time_code_message() {
        let message = one_time_code_message("s@example.com", "ada@example.com", "123456", 10);
        assert!(message.text.as_deref().unwrap().contains("123456"));
        assert!(message.text.as_deref().unwrap().contains("10 minutes"));
        assert!(
            message
                .html
                .as_deref()
                .unwrap()
                .contains("<strong>123456</strong>")
        );
    }

    #[test]
    fn test_verification_link_encodes_query() {
        assert_eq!(
            email_verification_link("http://localhost:3000", "ada lovelace@example.com", "a&b=c"),
            "http://localhost:3000/api/verify-email?email=ada+lovelace%40example.com&token=a%26b%3Dc"
        );
        assert_eq!(
            email_verification_link("https://x.example//", "a@b.c", "t"),
            "https://x.example/api/verify-email?email=a%40b.c&token=t"
        );
    }

    #[test]
    fn test_email_verification_message() {
        let link = email_verification_link("https://app.example.com", "ada@example.com", "abc");
        let message = email_verification_message("s@example.com", "ada@example.com", &link, 24);
        assert_eq!(message.subject, "Confirm your email address");

        let text = message.text.as_deref().unwrap();
        assert!(text.contains("email=ada%40example.com&token=abc"));
        assert!(text.contains("24 hours"));

        let html = message.html.as_deref().unwrap();
        assert!(html.contains("email=ada%40example.com&amp;token=abc"));
        assert!(!html.contains("&token"));
    }

    #[tokio::test]
    async fn test_send_through_mock() {
        let mock = MockTransport::new("login-otp");
        let receipt = send_one_time_code(&mock, "s@example.com", "ada@example.com", "424242", 5)
            .await
            .unwrap();
        assert!(receipt.message.contains("424242"));
        assert!(receipt.message.contains("ada@example.com"));

        let receipt = send_password_reset(&mock, "s@example.com", "ada@example.com", "https://l")
            .await
            .unwrap();
        assert!(receipt.message.contains("Reset your password"));

        let receipt =
            send_email_verification(&mock, "s@example.com", "ada@example.com", "https://v", 24)
                .await
                .unwrap();
        assert!(receipt.message.contains("Confirm your email address"));
    }
}
