//! One SMTP send, start to finish.
//!
//! Each call opens its own connection. The client is consumed step by step,
//! so any failure drops it and closes the socket before the error is
//! returned. Nothing is retried.

use postwire_mime::{OutboundMessage, build_mime_message, extract_address};
use postwire_smtp::{Address, Client, ConnectionConfig, Connector, Error, Result};
use tracing::{debug, info};

use crate::transport::Receipt;

/// Sends `message` through a fresh connection opened by `connector`.
///
/// Recipients and the sender are validated before any socket is opened.
/// The receipt carries the encoded payload.
///
/// # Errors
///
/// Returns [`Error::NoRecipients`] or [`Error::BadFromAddress`] for an
/// unusable envelope, otherwise the first protocol or transport error.
pub async fn send_mail<C: Connector>(
    connector: &C,
    config: &ConnectionConfig,
    message: &OutboundMessage,
) -> Result<Receipt> {
    let recipients = message
        .to
        .normalize()
        .iter()
        .map(|r| Address::new(extract_address(r)))
        .collect::<Result<Vec<_>>>()?;
    let mut recipients = recipients.into_iter();
    let first = recipients.next().ok_or(Error::NoRecipients)?;

    let from = extract_address(&message.from);
    if from.is_empty() {
        return Err(Error::BadFromAddress(message.from.clone()));
    }
    let from = Address::new(from).map_err(|_| Error::BadFromAddress(message.from.clone()))?;

    let payload = build_mime_message(message);

    let client = Client::connect(connector, config).await?;
    let client = client.ehlo(&config.client_name).await?;
    let client = if !client.is_encrypted() && client.capabilities().supports_starttls() {
        debug!(host = %config.host, "upgrading with STARTTLS");
        client.starttls(&config.host, &config.client_name).await?
    } else {
        client
    };

    let client = client.authenticate(config.credentials.as_ref()).await?;
    let client = client.mail_from(from).await?;
    let mut client = client.rcpt_to(first).await?;
    for rcpt in recipients {
        client = client.rcpt_to(rcpt).await?;
    }

    let client = client.data().await?;
    let client = client.send_message(payload.as_bytes()).await?;
    client.quit().await;

    info!(host = %config.host, port = config.port, "message accepted");
    Ok(Receipt { message: payload })
}
