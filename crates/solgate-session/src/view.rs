//! The gate view model.
//!
//! `view` is a pure function of the session: given the same phase,
//! address, and adapter list it produces an identical [`GateView`], so
//! the front-ends can re-render as often as they like. No messages or
//! control decisions live anywhere else.

use solgate_types::{SessionPhase, VerifyFailure};

use crate::session::Session;

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// An interactive control the current phase permits.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Control {
    /// Connect button for one discovered adapter.
    ConnectAdapter { index: usize, name: String },
    /// Start verification.
    Verify,
    /// Retry a failed verification.
    Retry,
    /// Disconnect the wallet.
    Disconnect,
}

// ---------------------------------------------------------------------------
// GateView
// ---------------------------------------------------------------------------

/// UI-agnostic rendering of the session, consumed by the GUI and CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct GateView {
    /// Phase the view was rendered from.
    pub phase: SessionPhase,
    /// Wallet status line.
    pub status: String,
    /// Connected wallet address, when there is one.
    pub address: Option<String>,
    /// Verification status or error message.
    pub detail: Option<String>,
    /// Marketplace link to surface next to an insufficient-NFTs message.
    pub purchase_url: Option<String>,
    /// Pairing URL the user must open while an adapter is connecting.
    pub pairing_url: Option<String>,
    /// Controls the current phase permits, in render order.
    pub controls: Vec<Control>,
    /// Whether an async operation is in flight (loader shown).
    pub busy: bool,
    /// Fatal startup view: no interactive recovery is offered.
    pub terminal: bool,
}

impl GateView {
    fn base(phase: SessionPhase, status: impl Into<String>) -> Self {
        Self {
            phase,
            status: status.into(),
            address: None,
            detail: None,
            purchase_url: None,
            pairing_url: None,
            controls: Vec::new(),
            busy: false,
            terminal: false,
        }
    }
}

/// Blocking startup-failure view.
pub fn fatal_view(message: &str) -> GateView {
    let mut v = GateView::base(SessionPhase::Disconnected, "Startup failed");
    v.detail = Some(message.to_string());
    v.terminal = true;
    v
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Renders the session into a view model.
pub fn view(session: &Session, adapter_names: &[String]) -> GateView {
    match session.phase {
        SessionPhase::Disconnected => {
            if adapter_names.is_empty() {
                return GateView::base(
                    session.phase,
                    "No compatible wallets detected. Install Phantom or Solflare and try again.",
                );
            }
            let mut v = GateView::base(session.phase, "Not connected");
            v.detail = session.last_error.clone();
            v.controls = adapter_names
                .iter()
                .enumerate()
                .map(|(index, name)| Control::ConnectAdapter {
                    index,
                    name: name.clone(),
                })
                .collect();
            v
        }

        SessionPhase::Connecting => {
            let name = session
                .active
                .and_then(|i| adapter_names.get(i))
                .map(String::as_str)
                .unwrap_or("wallet");
            let mut v = GateView::base(session.phase, format!("Connecting to {name}..."));
            v.pairing_url = session.pairing_url.clone();
            v.busy = true;
            v
        }

        SessionPhase::Connected => {
            let mut v = GateView::base(session.phase, "Connected");
            v.address = session.connected_address.as_ref().map(|a| a.to_string());
            v.controls = vec![Control::Verify, Control::Disconnect];
            v
        }

        SessionPhase::Verifying => {
            let mut v = GateView::base(session.phase, "Connected");
            v.address = session.connected_address.as_ref().map(|a| a.to_string());
            v.detail = Some("Verifying NFT holdings...".into());
            v.busy = true;
            v
        }

        SessionPhase::Verified => {
            let mut v = GateView::base(session.phase, "Connected");
            v.address = session.connected_address.as_ref().map(|a| a.to_string());
            v.detail =
                Some("Success! Verification complete. You can close this window.".into());
            v
        }

        SessionPhase::Failed => {
            let mut v = GateView::base(session.phase, "Connected");
            v.address = session.connected_address.as_ref().map(|a| a.to_string());
            v.detail = Some(
                session
                    .failure
                    .as_ref()
                    .map(failure_message)
                    .unwrap_or_else(|| "Verification failed.".into()),
            );
            if let Some(VerifyFailure::InsufficientNfts {
                purchase_url: Some(url),
                ..
            }) = &session.failure
            {
                v.purchase_url = Some(url.clone());
            }
            v.controls = vec![Control::Retry, Control::Disconnect];
            v
        }
    }
}

/// Human-readable message for a verification failure.
pub fn failure_message(failure: &VerifyFailure) -> String {
    match failure {
        VerifyFailure::InsufficientNfts {
            required: Some(n), ..
        } => {
            format!("Verification failed. You need at least {n} NFTs from the collection.")
        }
        VerifyFailure::InsufficientNfts { required: None, .. } => {
            "Verification failed. Your wallet does not hold enough NFTs from the collection."
                .into()
        }
        VerifyFailure::Rejected { message } => format!("Verification failed: {message}"),
        VerifyFailure::Transport { .. } => {
            "Network error during verification. Please try again.".into()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
