//! # postwire-smtp
//!
//! A small SMTP submission client written against the wire protocol.
//!
//! ## Features
//!
//! - **Type-state transaction**: MAIL FROM only after authentication has
//!   settled, DATA only after an accepted recipient
//! - **Reply framing**: multi-line replies assembled by an explicit state
//!   machine ([`parser::ReplyParser`])
//! - **TLS**: implicit TLS (port 465) and in-place STARTTLS upgrade with
//!   mandatory EHLO re-issue
//! - **Authentication**: AUTH LOGIN
//! - **Timeouts**: every connect, read, write and handshake is bounded
//!
//! ## Quick Start
//!
//! ```ignore
//! use postwire_smtp::{Address, Client, ConnectionConfig, Credentials, TcpConnector};
//!
//! #[tokio::main]
//! async fn main() -> postwire_smtp::Result<()> {
//!     let config = ConnectionConfig::builder("smtp.example.com")
//!         .credentials(Credentials::new("user", "password"))
//!         .build();
//!
//!     let client = Client::connect(&TcpConnector, &config).await?;
//!     let client = client.ehlo("client.example.com").await?;
//!     let client = if client.capabilities().supports_starttls() {
//!         client.starttls("smtp.example.com", "client.example.com").await?
//!     } else {
//!         client
//!     };
//!
//!     let client = client.authenticate(config.credentials.as_ref()).await?;
//!     let client = client.mail_from(Address::new("sender@example.com")?).await?;
//!     let client = client.rcpt_to(Address::new("recipient@example.com")?).await?;
//!     let client = client.data().await?;
//!     let client = client.send_message(b"Subject: Test\r\n\r\nHello\r\n").await?;
//!
//!     client.quit().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────┐  authenticate()  ┌───────┐  mail_from()  ┌─────────────────┐
//! │ Greeted  │ ───────────────→ │ Ready │ ────────────→ │ MailTransaction │
//! └──────────┘                  └───────┘               └─────────────────┘
//!   ehlo() / starttls()            ↑                           │ rcpt_to()
//!                                  │ send_message()            ↓
//!                               ┌──────┐    data()    ┌────────────────┐
//!                               │ Data │ ←─────────── │ RecipientAdded │
//!                               └──────┘              └────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Channel, Client, ConnectionConfig, Connector, Credentials, Data, Greeted, MailTransaction,
    Ready, RecipientAdded, SmtpStream, TcpConnector,
};
pub use error::{AuthStage, Error, Result};
pub use types::{Address, Capabilities, Reply, ReplyCode};
