//! # postwire-core
//!
//! Outbound mail for an application:
//! - Settings from the environment and transport resolution
//! - SMTP dispatch over a fresh connection per message
//! - A logging mock transport when nothing is configured
//! - A process-wide mailer built on first use
//! - Password reset and one-time code notifications

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
mod error;
pub mod mailer;
pub mod notify;
pub mod transport;

pub use config::{DiscreteFields, Environment, Resolution, Settings, TransportSettings};
pub use dispatch::send_mail;
pub use error::{ConfigError, MailError, Result};
pub use transport::{Mailer, MockTransport, Receipt, SmtpTransport, Transport};

pub use postwire_mime::{OutboundMessage, Recipients};
