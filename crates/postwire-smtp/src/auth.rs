//! AUTH LOGIN.
//!
//! ```text
//! C: AUTH LOGIN          S: 334 VXNlcm5hbWU6
//! C: base64(user)        S: 334 UGFzc3dvcmQ6
//! C: base64(pass)        S: 235 Authentication successful
//! ```
//!
//! A `503` to `AUTH LOGIN` or to the password line is accepted as "already
//! authenticated". This is a compatibility shim for relays that
//! authenticate by other means (for example by client IP) and answer a
//! redundant AUTH with bad-sequence; it is not a guarantee that the session
//! is authenticated.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::command::Command;
use crate::connection::{Connection, Credentials};
use crate::error::{AuthStage, Error, Result};
use crate::types::{Reply, ReplyCode};

/// Authenticates with AUTH LOGIN if credentials are configured.
///
/// Credentials are never retried: the first rejection fails the send.
///
/// # Errors
///
/// Returns [`Error::AuthFailed`] tagged with the rejected stage, or a
/// transport error.
pub async fn authenticate<S>(
    conn: &mut Connection<S>,
    credentials: Option<&Credentials>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Some(credentials) = credentials else {
        return Ok(());
    };

    let initial = conn.send_command(Some(&Command::AuthLogin)).await?;
    if initial.code == ReplyCode::BAD_SEQUENCE {
        warn!("AUTH LOGIN answered with 503, assuming session is already authenticated");
        return Ok(());
    }
    expect(&initial, ReplyCode::AUTH_CONTINUE, AuthStage::Init)?;

    let user = Command::AuthResponse(STANDARD.encode(credentials.user.as_bytes()));
    let reply = conn.send_command(Some(&user)).await?;
    expect(&reply, ReplyCode::AUTH_CONTINUE, AuthStage::Username)?;

    let pass = Command::AuthResponse(STANDARD.encode(credentials.pass.as_bytes()));
    let reply = conn.send_command(Some(&pass)).await?;
    if reply.code == ReplyCode::BAD_SEQUENCE {
        warn!("AUTH password answered with 503, assuming session is already authenticated");
        return Ok(());
    }
    expect(&reply, ReplyCode::AUTH_SUCCESS, AuthStage::Password)?;

    debug!(user = %credentials.user, "authenticated");
    Ok(())
}

fn expect(reply: &Reply, code: ReplyCode, stage: AuthStage) -> Result<()> {
    if reply.code == code {
        Ok(())
    } else {
        Err(Error::AuthFailed {
            stage,
            code: reply.code.as_u16(),
            message: reply.message_text(),
        })
    }
}
