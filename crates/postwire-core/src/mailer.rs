//! Process-wide mailer.
//!
//! The mailer is built on first use, from the environment or from given
//! settings, and reused for the life of the process. Concurrent first
//! callers wait for the same initialization; at most one mailer is ever
//! constructed.

use tokio::sync::OnceCell;

use crate::config::Settings;
use crate::error::ConfigError;
use crate::transport::Mailer;

const TAG: &str = "mailer";

static MAILER: OnceCell<Mailer> = OnceCell::const_new();

/// Returns the process-wide mailer, building it from the environment if
/// needed.
///
/// # Errors
///
/// Returns the configuration error if the first construction fails; a later
/// call retries construction.
pub async fn global() -> Result<&'static Mailer, ConfigError> {
    MAILER
        .get_or_try_init(|| async { Mailer::from_settings(&Settings::from_env(), TAG) })
        .await
}

/// Like [`global`], but builds the mailer from `settings` instead of
/// reading the environment again. Ignored once a mailer exists.
///
/// # Errors
///
/// Returns the configuration error if construction fails.
pub async fn global_with(settings: &Settings) -> Result<&'static Mailer, ConfigError> {
    MAILER
        .get_or_try_init(|| async { Mailer::from_settings(settings, TAG) })
        .await
}

/// Installs `mailer` as the process-wide mailer.
///
/// # Errors
///
/// Returns the mailer back if one is already installed.
pub fn install(mailer: Mailer) -> Result<(), Mailer> {
    MAILER.set(mailer).map_err(|e| match e {
        tokio::sync::SetError::AlreadyInitializedError(m)
        | tokio::sync::SetError::InitializingError(m) => m,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::TransportSettings;
    use crate::transport::MockTransport;

    #[tokio::test]
    async fn test_first_settings_win() {
        let settings = Settings {
            transport: TransportSettings::ConnectionString("smtps://mail.example.com".into()),
            ..Settings::default()
        };

        let first = global_with(&settings).await.unwrap();
        assert!(!first.is_mock());

        let second = global().await.unwrap();
        assert!(std::ptr::eq(first, second));

        let third = global_with(&Settings::default()).await.unwrap();
        assert!(std::ptr::eq(first, third));

        assert!(install(Mailer::Mock(MockTransport::default())).is_err());
    }
}
