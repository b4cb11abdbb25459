//! The session: the only stateful entity in the gate.

use chrono::{DateTime, Utc};

use solgate_types::{SessionPhase, TelegramUserId, VerifyFailure, WalletAddress};

/// Wallet-connect/verify session state.
///
/// Created at startup in the disconnected phase and mutated only by the
/// controller in response to adapter events or backend responses. Not
/// persisted; the session ends with the process.
#[derive(Debug)]
pub struct Session {
    /// Current phase of the connect/verify flow.
    pub phase: SessionPhase,
    /// Index of the adapter currently bound to events, if any.
    /// At most one adapter is bound at a time.
    pub active: Option<usize>,
    /// Public key of the connected wallet.
    /// Present iff the phase is at or past `Connected`.
    pub connected_address: Option<WalletAddress>,
    /// Identifier of the user being verified. Resolved once at startup.
    pub user_id: TelegramUserId,
    /// Human-readable reason the session fell back to disconnected.
    pub last_error: Option<String>,
    /// Structured failure of the most recent verification attempt.
    pub failure: Option<VerifyFailure>,
    /// Pairing URL surfaced while an out-of-band adapter is connecting.
    pub pairing_url: Option<String>,
    /// When the wallet connected, for diagnostics.
    pub connected_at: Option<DateTime<Utc>>,
    /// Generation counter. Bumped every time the session returns to
    /// disconnected; async results started under an older epoch are
    /// dropped instead of resurrecting a superseded state.
    epoch: u64,
}

impl Session {
    /// New session in the disconnected phase.
    pub fn new(user_id: TelegramUserId) -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            active: None,
            connected_address: None,
            user_id,
            last_error: None,
            failure: None,
            pairing_url: None,
            connected_at: None,
            epoch: 0,
        }
    }

    /// Current generation.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Records a successful wallet connection.
    pub fn mark_connected(&mut self, address: WalletAddress) {
        self.phase = SessionPhase::Connected;
        self.connected_address = Some(address);
        self.connected_at = Some(Utc::now());
        self.pairing_url = None;
        self.last_error = None;
    }

    /// Returns the session to disconnected, invalidating every
    /// in-flight async result tied to the previous generation.
    pub fn reset(&mut self, error: Option<String>) {
        self.epoch += 1;
        self.phase = SessionPhase::Disconnected;
        self.active = None;
        self.connected_address = None;
        self.failure = None;
        self.pairing_url = None;
        self.connected_at = None;
        self.last_error = error;
    }

    /// Whether a verification attempt is currently permitted.
    pub fn can_verify(&self) -> bool {
        matches!(self.phase, SessionPhase::Connected | SessionPhase::Failed)
            && self.connected_address.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> WalletAddress {
        WalletAddress::new("4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi").unwrap()
    }

    #[test]
    fn starts_disconnected() {
        let session = Session::new(TelegramUserId::new(1));
        assert_eq!(session.phase, SessionPhase::Disconnected);
        assert!(session.connected_address.is_none());
        assert!(session.active.is_none());
        assert_eq!(session.epoch(), 0);
    }

    #[test]
    fn mark_connected_sets_address_and_timestamp() {
        let mut session = Session::new(TelegramUserId::new(1));
        session.mark_connected(address());
        assert_eq!(session.phase, SessionPhase::Connected);
        assert_eq!(session.connected_address, Some(address()));
        assert!(session.connected_at.is_some());
    }

    #[test]
    fn reset_bumps_epoch_and_clears_state() {
        let mut session = Session::new(TelegramUserId::new(1));
        session.active = Some(0);
        session.mark_connected(address());

        let before = session.epoch();
        session.reset(Some("wallet went away".into()));

        assert_eq!(session.epoch(), before + 1);
        assert_eq!(session.phase, SessionPhase::Disconnected);
        assert!(session.active.is_none());
        assert!(session.connected_address.is_none());
        assert_eq!(session.last_error.as_deref(), Some("wallet went away"));
    }

    #[test]
    fn can_verify_requires_connected_or_failed_with_address() {
        let mut session = Session::new(TelegramUserId::new(1));
        assert!(!session.can_verify());

        session.mark_connected(address());
        assert!(session.can_verify());

        session.phase = SessionPhase::Verifying;
        assert!(!session.can_verify());

        session.phase = SessionPhase::Failed;
        assert!(session.can_verify());

        session.phase = SessionPhase::Verified;
        assert!(!session.can_verify());
    }
}
