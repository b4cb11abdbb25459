//! The wallet adapter contract.

use tokio::sync::mpsc;

use solgate_types::{Result, WalletAddress};

// ---------------------------------------------------------------------------
// AdapterEvent
// ---------------------------------------------------------------------------

/// Lifecycle events an adapter delivers over its bound channel.
///
/// Every event names the adapter that produced it so the controller can
/// reject events from a superseded adapter (the contract is provided by
/// external wallet plumbing and is not fully trustworthy).
#[derive(Debug, Clone)]
pub enum AdapterEvent {
    /// A pairing URL the user must open to approve the connection.
    /// Only emitted by adapters that pair out-of-band.
    Pairing {
        /// Name of the producing adapter.
        adapter: String,
        /// URL to present to the user.
        url: String,
    },
    /// The wallet approved the connection.
    Connected {
        /// Name of the producing adapter.
        adapter: String,
        /// The wallet's public key.
        address: WalletAddress,
    },
    /// A previously initiated connect attempt failed.
    ConnectFailed {
        /// Name of the producing adapter.
        adapter: String,
        /// Human-readable failure reason.
        reason: String,
    },
    /// The wallet disconnected (user action on the wallet side, or the
    /// adapter gave up).
    Disconnected {
        /// Name of the producing adapter.
        adapter: String,
    },
}

impl AdapterEvent {
    /// Name of the adapter that produced this event.
    pub fn adapter(&self) -> &str {
        match self {
            Self::Pairing { adapter, .. }
            | Self::Connected { adapter, .. }
            | Self::ConnectFailed { adapter, .. }
            | Self::Disconnected { adapter } => adapter,
        }
    }
}

// ---------------------------------------------------------------------------
// WalletAdapter trait
// ---------------------------------------------------------------------------

/// A library object mediating connect/disconnect with one wallet vendor.
///
/// `connect` only *initiates* the attempt: completion (success or
/// failure) arrives asynchronously as an [`AdapterEvent`] on the bound
/// channel, any time after the call returns. Callers must `bind` before
/// `connect`, and `unbind` releases the channel *and* aborts any
/// in-flight attempt, so a previously active adapter can never deliver
/// into a binding it no longer owns.
pub trait WalletAdapter: Send {
    /// Vendor name shown on the connect button. An adapter with an
    /// empty name is unusable and is skipped during discovery.
    fn name(&self) -> &str;

    /// The connected wallet's public key, if connected.
    fn public_key(&self) -> Option<WalletAddress>;

    /// Binds the event channel. Replaces any previous binding.
    fn bind(&mut self, events: mpsc::Sender<AdapterEvent>);

    /// Releases the event channel and aborts any in-flight attempt.
    fn unbind(&mut self);

    /// Whether an event channel is currently bound.
    fn is_bound(&self) -> bool;

    /// Initiates a connection attempt. Returns an error only when the
    /// attempt cannot even be started (unbound adapter, dead vendor
    /// library); otherwise the outcome arrives as an event.
    fn connect(&mut self) -> Result<()>;

    /// Initiates a disconnect. Errors are advisory: the controller
    /// forces the session back to disconnected regardless.
    fn disconnect(&mut self) -> Result<()>;
}
