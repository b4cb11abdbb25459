//! The Telegram window-lifecycle bridge.
//!
//! Outside a real Telegram webview there is no window to drive, so the
//! lifecycle calls are recorded and logged; the session controller only
//! cares that `close()` is observable and that the user id is resolved
//! before anything interactive happens.

use solgate_types::{HostBridge, Result, SolgateError, TelegramUserId};

use crate::init_data;

/// Environment variable carrying the raw init-data query string.
pub const INIT_DATA_VAR: &str = "TELEGRAM_INIT_DATA";

/// Environment variable carrying a bare user id (development fallback).
pub const USER_ID_VAR: &str = "TELEGRAM_USER_ID";

// ---------------------------------------------------------------------------
// TelegramHost
// ---------------------------------------------------------------------------

/// Host bridge backed by the Telegram Mini-App launch payload.
#[derive(Debug, Default)]
pub struct TelegramHost {
    user_id: Option<TelegramUserId>,
    username: Option<String>,
    ready: bool,
    expanded: bool,
    closed: bool,
}

impl TelegramHost {
    /// Host with an explicit user id.
    pub fn with_user_id(user_id: TelegramUserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Host parsed from a raw init-data query string.
    pub fn from_init_data(raw: &str) -> Result<Self> {
        let data = init_data::parse(raw)?;
        Ok(Self {
            user_id: Some(data.user_id),
            username: data.username,
            ..Self::default()
        })
    }

    /// Host resolved from the environment.
    ///
    /// Prefers [`INIT_DATA_VAR`]; falls back to [`USER_ID_VAR`]. Fails
    /// if neither yields a user id.
    pub fn from_env() -> Result<Self> {
        if let Ok(raw) = std::env::var(INIT_DATA_VAR) {
            return Self::from_init_data(&raw);
        }
        if let Ok(raw) = std::env::var(USER_ID_VAR) {
            let user_id: TelegramUserId = raw.parse()?;
            return Ok(Self::with_user_id(user_id));
        }
        Err(SolgateError::HostError {
            reason: format!("neither {INIT_DATA_VAR} nor {USER_ID_VAR} is set; launch from Telegram"),
        })
    }

    /// Host with no user identity. Startup against this host fails the
    /// controller's capability check and surfaces the blocking error.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Telegram username, if known.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Whether `ready()` has been called.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether `expand()` has been called.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl HostBridge for TelegramHost {
    fn user_id(&self) -> Option<TelegramUserId> {
        self.user_id
    }

    fn ready(&mut self) {
        if !self.ready {
            self.ready = true;
            tracing::debug!("host ready");
        }
    }

    fn expand(&mut self) {
        if !self.expanded {
            self.expanded = true;
            tracing::debug!("host expanded");
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            tracing::info!("host close requested");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_user_id_reports_it() {
        let host = TelegramHost::with_user_id(TelegramUserId::new(42));
        assert_eq!(host.user_id().map(|u| u.as_i64()), Some(42));
    }

    #[test]
    fn detached_has_no_user() {
        let host = TelegramHost::detached();
        assert!(host.user_id().is_none());
    }

    #[test]
    fn from_init_data_extracts_user() -> Result<()> {
        let host =
            TelegramHost::from_init_data("user=%7B%22id%22%3A99%2C%22username%22%3A%22bob%22%7D")?;
        assert_eq!(host.user_id().map(|u| u.as_i64()), Some(99));
        assert_eq!(host.username(), Some("bob"));
        Ok(())
    }

    #[test]
    fn from_init_data_rejects_missing_user() {
        assert!(TelegramHost::from_init_data("auth_date=1").is_err());
    }

    #[test]
    fn lifecycle_flags_are_recorded() {
        let mut host = TelegramHost::with_user_id(TelegramUserId::new(1));
        assert!(!host.is_ready());
        assert!(!host.is_expanded());
        assert!(!host.is_closed());

        host.ready();
        host.expand();
        host.close();

        assert!(host.is_ready());
        assert!(host.is_expanded());
        assert!(host.is_closed());
    }

    #[test]
    fn lifecycle_calls_are_idempotent() {
        let mut host = TelegramHost::with_user_id(TelegramUserId::new(1));
        host.close();
        host.close();
        assert!(host.is_closed());
    }
}
