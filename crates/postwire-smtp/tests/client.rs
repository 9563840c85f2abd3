//! Integration tests for the type-state client.
//!
//! The server side is scripted byte for byte with `tokio_test::io::Builder`;
//! a write the script does not expect fails the test.

#![allow(clippy::unwrap_used)]

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_test::io::{Builder, Mock};

use postwire_smtp::connection::Connection;
use postwire_smtp::{Address, Channel, Client, Credentials, Error};

/// Scripted channel whose TLS upgrade only flips a flag.
#[derive(Debug)]
struct Scripted {
    mock: Mock,
    encrypted: bool,
}

impl Scripted {
    fn new(mock: Mock) -> Self {
        Self {
            mock,
            encrypted: false,
        }
    }
}

impl AsyncRead for Scripted {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.mock).poll_read(cx, buf)
    }
}

impl AsyncWrite for Scripted {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.mock).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.mock).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.mock).poll_shutdown(cx)
    }
}

impl Channel for Scripted {
    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    async fn upgrade_to_tls(mut self, _hostname: &str) -> postwire_smtp::Result<Self> {
        self.encrypted = true;
        Ok(self)
    }
}

async fn greet(mock: Mock) -> postwire_smtp::Result<Client<postwire_smtp::Greeted, Scripted>> {
    Client::from_connection(Connection::new(
        Scripted::new(mock),
        Duration::from_secs(15),
    ))
    .await
}

fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

#[tokio::test]
async fn test_full_transaction_over_starttls() {
    let mock = Builder::new()
        .read(b"220 mx.example.com ESMTP\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"250-mx.example.com\r\n250-PIPELINING\r\n250 STARTTLS\r\n")
        .write(b"STARTTLS\r\n")
        .read(b"220 2.0.0 Ready to start TLS\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"250-mx.example.com\r\n250 AUTH LOGIN PLAIN\r\n")
        .write(b"AUTH LOGIN\r\n")
        .read(b"334 VXNlcm5hbWU6\r\n")
        .write(b"dXNlcg==\r\n")
        .read(b"334 UGFzc3dvcmQ6\r\n")
        .write(b"c2VjcmV0\r\n")
        .read(b"235 2.7.0 Accepted\r\n")
        .write(b"MAIL FROM:<sender@example.com>\r\n")
        .read(b"250 2.1.0 Ok\r\n")
        .write(b"RCPT TO:<a@example.com>\r\n")
        .read(b"250 2.1.5 Ok\r\n")
        .write(b"RCPT TO:<b@example.com>\r\n")
        .read(b"251 2.1.5 Forwarding\r\n")
        .write(b"DATA\r\n")
        .read(b"354 End data with <CR><LF>.<CR><LF>\r\n")
        .write(b"Subject: hi\r\n\r\n..leading dot\r\n.\r\n")
        .read(b"250 2.0.0 Queued\r\n")
        .write(b"QUIT\r\n")
        .read(b"221 2.0.0 Bye\r\n")
        .build();

    let client = greet(mock).await.unwrap();
    let client = client.ehlo("client.test").await.unwrap();
    assert!(client.capabilities().supports_starttls());
    assert!(!client.is_encrypted());

    let client = client.starttls("mx.example.com", "client.test").await.unwrap();
    assert!(client.is_encrypted());
    assert!(!client.capabilities().supports_starttls());
    assert_eq!(client.capabilities().auth_mechanisms(), vec!["LOGIN", "PLAIN"]);

    let creds = Credentials::new("user", "secret");
    let client = client.authenticate(Some(&creds)).await.unwrap();
    let client = client.mail_from(addr("sender@example.com")).await.unwrap();
    let client = client.rcpt_to(addr("a@example.com")).await.unwrap();
    let client = client.rcpt_to(addr("b@example.com")).await.unwrap();
    let client = client.data().await.unwrap();
    let client = client
        .send_message(b"Subject: hi\r\n\r\n.leading dot\r\n")
        .await
        .unwrap();
    client.quit().await;
}

#[tokio::test]
async fn test_auth_login_tried_when_not_advertised() {
    let mock = Builder::new()
        .read(b"220 mx.example.com ESMTP\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"250-mx.example.com\r\n250 AUTH PLAIN\r\n")
        .write(b"AUTH LOGIN\r\n")
        .read(b"334 VXNlcm5hbWU6\r\n")
        .write(b"dXNlcg==\r\n")
        .read(b"334 UGFzc3dvcmQ6\r\n")
        .write(b"c2VjcmV0\r\n")
        .read(b"235 2.7.0 Accepted\r\n")
        .write(b"QUIT\r\n")
        .read(b"250 Ok\r\n")
        .build();

    let client = greet(mock).await.unwrap();
    let client = client.ehlo("client.test").await.unwrap();
    assert_eq!(client.capabilities().auth_mechanisms(), vec!["PLAIN"]);

    let creds = Credentials::new("user", "secret");
    let client = client.authenticate(Some(&creds)).await.unwrap();
    client.quit().await;
}

#[tokio::test]
async fn test_greeting_rejected() {
    let mock = Builder::new()
        .read(b"554 5.3.2 No service for you\r\n")
        .build();

    let err = greet(mock).await.unwrap_err();
    assert!(matches!(err, Error::GreetingRejected { code: 554, .. }));
    assert!(err.to_string().contains("554"));
}

#[tokio::test]
async fn test_starttls_rejected() {
    let mock = Builder::new()
        .read(b"220 mx ESMTP\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"250-mx\r\n250 STARTTLS\r\n")
        .write(b"STARTTLS\r\n")
        .read(b"454 4.7.0 TLS not available\r\n")
        .build();

    let client = greet(mock).await.unwrap().ehlo("client.test").await.unwrap();
    let err = client.starttls("mx", "client.test").await.unwrap_err();
    assert!(matches!(err, Error::StartTlsRejected { code: 454, .. }));
}

#[tokio::test]
async fn test_ehlo_rejected() {
    let mock = Builder::new()
        .read(b"220 mx ESMTP\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"502 5.5.2 Command not recognized\r\n")
        .build();

    let err = greet(mock).await.unwrap().ehlo("client.test").await.unwrap_err();
    assert!(matches!(
        err,
        Error::CommandRejected {
            verb: "EHLO",
            code: 502,
            ..
        }
    ));
}

#[tokio::test]
async fn test_second_recipient_rejected_stops_before_data() {
    let mock = Builder::new()
        .read(b"220 mx ESMTP\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"250 mx\r\n")
        .write(b"MAIL FROM:<sender@example.com>\r\n")
        .read(b"250 Ok\r\n")
        .write(b"RCPT TO:<a@example.com>\r\n")
        .read(b"250 Ok\r\n")
        .write(b"RCPT TO:<nobody@example.com>\r\n")
        .read(b"550 5.1.1 No such user\r\n")
        .build();

    let client = greet(mock).await.unwrap().ehlo("client.test").await.unwrap();
    let client = client.authenticate(None).await.unwrap();
    let client = client.mail_from(addr("sender@example.com")).await.unwrap();
    let client = client.rcpt_to(addr("a@example.com")).await.unwrap();
    let err = client.rcpt_to(addr("nobody@example.com")).await.unwrap_err();

    assert!(matches!(
        err,
        Error::CommandRejected {
            verb: "RCPT TO",
            code: 550,
            ..
        }
    ));
}

#[tokio::test]
async fn test_mail_from_requires_250() {
    let mock = Builder::new()
        .read(b"220 mx ESMTP\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"250 mx\r\n")
        .write(b"MAIL FROM:<sender@example.com>\r\n")
        .read(b"251 odd\r\n")
        .build();

    let client = greet(mock).await.unwrap().ehlo("client.test").await.unwrap();
    let client = client.authenticate(None).await.unwrap();
    let err = client.mail_from(addr("sender@example.com")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::CommandRejected {
            verb: "MAIL FROM",
            code: 251,
            ..
        }
    ));
}

#[tokio::test]
async fn test_message_rejected_after_data() {
    let mock = Builder::new()
        .read(b"220 mx ESMTP\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"250 mx\r\n")
        .write(b"MAIL FROM:<sender@example.com>\r\n")
        .read(b"250 Ok\r\n")
        .write(b"RCPT TO:<a@example.com>\r\n")
        .read(b"250 Ok\r\n")
        .write(b"DATA\r\n")
        .read(b"354 go ahead\r\n")
        .write(b"body\r\n.\r\n")
        .read(b"554 5.7.1 Spam\r\n")
        .build();

    let client = greet(mock).await.unwrap().ehlo("client.test").await.unwrap();
    let client = client.authenticate(None).await.unwrap();
    let client = client.mail_from(addr("sender@example.com")).await.unwrap();
    let client = client.rcpt_to(addr("a@example.com")).await.unwrap();
    let client = client.data().await.unwrap();
    let err = client.send_message(b"body").await.unwrap_err();
    assert!(matches!(
        err,
        Error::CommandRejected {
            verb: "DATA",
            code: 554,
            ..
        }
    ));
}

#[tokio::test]
async fn test_quit_ignores_reply() {
    let mock = Builder::new()
        .read(b"220 mx ESMTP\r\n")
        .write(b"QUIT\r\n")
        .read(b"500 whatever\r\n")
        .build();

    greet(mock).await.unwrap().quit().await;
}

#[tokio::test]
async fn test_connection_closed_mid_reply() {
    let mock = Builder::new()
        .read(b"220 mx ESMTP\r\n")
        .write(b"EHLO client.test\r\n")
        .read(b"250-mx\r\n")
        .build();

    let err = greet(mock).await.unwrap().ehlo("client.test").await.unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed));
}
