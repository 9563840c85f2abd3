//! `postwire` - send notification emails through the configured transport.
//!
//! The transport comes from `EMAIL_SERVER` or the `SMTP_*` variables; with
//! neither set, messages are only logged.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use postwire_core::notify::{
    DEFAULT_CODE_VALIDITY_MINUTES, email_verification_link, password_reset_link,
    send_email_verification, send_one_time_code, send_password_reset,
};
use postwire_core::{Receipt, Settings, mailer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Send notification emails.
#[derive(Debug, Parser)]
#[command(about, version)]
struct Cli {
    /// Sender mailbox. Defaults to EMAIL_FROM, then SMTP_FROM.
    #[arg(long, global = true)]
    from: Option<String>,

    /// Print the receipt (encoded payload, or the logged message) to stdout.
    #[arg(long, global = true)]
    print_receipt: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a password reset link.
    PasswordReset {
        /// Recipient address.
        to: String,
        /// Reset token, or a full http(s) link. Tokens go under the base URL.
        token_or_link: String,
    },
    /// Send an email address verification link.
    EmailVerification {
        /// Recipient address, also carried in the link.
        to: String,
        /// Verification token, or a full http(s) link.
        token_or_link: String,
        /// How long the link is valid, in hours. Defaults to
        /// EMAIL_VERIFY_HOURS, then 24.
        #[arg(long)]
        valid_hours: Option<u32>,
    },
    /// Send a one-time sign-in code.
    OneTimeCode {
        /// Recipient address.
        to: String,
        /// The code.
        code: String,
        /// How long the code is valid, in minutes.
        #[arg(long, default_value_t = DEFAULT_CODE_VALIDITY_MINUTES)]
        valid_minutes: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postwire=info,postwire_core=info,postwire_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let from = match cli.from {
        Some(from) => from,
        None => settings.sender()?.to_string(),
    };

    let mailer = mailer::global_with(&settings)
        .await
        .context("failed to set up the email transport")?;

    let receipt = match &cli.cmd {
        Command::PasswordReset { to, token_or_link } => {
            let link = resolve_link(&settings, token_or_link, password_reset_link)?;
            send_password_reset(mailer, &from, to, &link)
                .await
                .with_context(|| format!("failed to send password reset email to {to}"))?
        }
        Command::EmailVerification {
            to,
            token_or_link,
            valid_hours,
        } => {
            let link = resolve_link(&settings, token_or_link, |base, token| {
                email_verification_link(base, to, token)
            })?;
            let valid_hours = match valid_hours {
                Some(hours) => *hours,
                None => settings.verify_hours()?,
            };
            send_email_verification(mailer, &from, to, &link, valid_hours)
                .await
                .with_context(|| format!("failed to send verification email to {to}"))?
        }
        Command::OneTimeCode {
            to,
            code,
            valid_minutes,
        } => send_one_time_code(mailer, &from, to, code, *valid_minutes)
            .await
            .with_context(|| format!("failed to send one-time code to {to}"))?,
    };

    info!(mock = mailer.is_mock(), "done");
    if cli.print_receipt {
        print_receipt(&receipt);
    }
    Ok(())
}

/// Uses `token_or_link` as is when it is already a link, otherwise builds
/// one with `build` under the configured base URL.
fn resolve_link<F>(settings: &Settings, token_or_link: &str, build: F) -> anyhow::Result<String>
where
    F: FnOnce(&str, &str) -> String,
{
    if token_or_link.starts_with("http://") || token_or_link.starts_with("https://") {
        return Ok(token_or_link.to_string());
    }
    let base = settings.base_url().context("cannot build the link")?;
    Ok(build(base, token_or_link))
}

#[allow(clippy::print_stdout)]
fn print_receipt(receipt: &Receipt) {
    println!("{}", receipt.message);
}
