//! SMTP connection management with type-state pattern.

mod client;
mod config;
mod engine;
mod stream;

pub use client::{Client, Data, Greeted, MailTransaction, Ready, RecipientAdded, encode_data};
pub use config::{
    ConfigBuilder, ConnectionConfig, Credentials, DEFAULT_TIMEOUT, IMPLICIT_TLS_PORT,
    SUBMISSION_PORT, default_port,
};
pub use engine::Connection;
pub use stream::{Channel, Connector, SmtpStream, TcpConnector, connect, connect_tls};
