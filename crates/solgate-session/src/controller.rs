//! The session controller and its async run loop.
//!
//! Runs on the tokio runtime. The UI communicates via bounded channels
//! using `try_send` / `try_recv` so the render loop is never blocked.
//! The controller `select!`s over three sources: UI commands, adapter
//! lifecycle events, and internal events (verification outcomes, the
//! auto-close timer). Suspension points run as spawned tasks that
//! report back through the internal channel, so a slow wallet or
//! backend can never stall the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use solgate_types::config::ConfigProvider;
use solgate_types::{HostBridge, Result, SessionPhase, SolgateError, VerifyFailure};
use solgate_wallet::adapter::AdapterEvent;
use solgate_wallet::factory::{usable, AdapterFactory};
use solgate_wallet::WalletAdapter;

use crate::session::Session;
use crate::verify::{HttpVerifier, VerifyBackend, VerifyOutcome};
use crate::view::{fatal_view, view, GateView};

// ---------------------------------------------------------------------------
// Channel sizes and timing
// ---------------------------------------------------------------------------

/// UI → controller command channel capacity.
pub const CMD_CHANNEL_SIZE: usize = 64;

/// Controller → UI update channel capacity.
pub const UPDATE_CHANNEL_SIZE: usize = 256;

/// Adapter event channel capacity.
const ADAPTER_CHANNEL_SIZE: usize = 64;

/// Internal event channel capacity.
const INTERNAL_CHANNEL_SIZE: usize = 16;

/// Delay between a successful verification and closing the host window.
pub const CLOSE_DELAY: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// SessionCommand — UI sends these to the controller
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SessionCommand {
    /// Connect the adapter at the given discovery index.
    Connect { adapter: usize },
    /// Disconnect the active wallet.
    Disconnect,
    /// Start (or retry) verification.
    Verify,
}

// ---------------------------------------------------------------------------
// SessionUpdate — controller sends these back to the UI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// A fresh rendering of the session. Pushed on every state change.
    View(GateView),
    /// The host window was asked to close; the front-end should exit.
    Closed,
}

// ---------------------------------------------------------------------------
// Internal events
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum InternalEvent {
    /// A verification round trip finished.
    VerifyDone { epoch: u64, outcome: VerifyOutcome },
    /// The post-verification close delay elapsed.
    CloseDue { epoch: u64 },
}

// ---------------------------------------------------------------------------
// Channel pair constructor
// ---------------------------------------------------------------------------

/// Creates the bounded channel pair for UI ↔ controller communication.
pub fn create_channels() -> (
    mpsc::Sender<SessionCommand>,
    mpsc::Receiver<SessionCommand>,
    mpsc::Sender<SessionUpdate>,
    mpsc::Receiver<SessionUpdate>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(CMD_CHANNEL_SIZE);
    let (update_tx, update_rx) = mpsc::channel(UPDATE_CHANNEL_SIZE);
    (cmd_tx, cmd_rx, update_tx, update_rx)
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Owns the [`Session`] and every collaborator handle.
pub struct SessionController {
    session: Session,
    adapters: Vec<Box<dyn WalletAdapter>>,
    host: Box<dyn HostBridge>,
    backend: Arc<dyn VerifyBackend>,
    adapter_tx: mpsc::Sender<AdapterEvent>,
    adapter_rx: Option<mpsc::Receiver<AdapterEvent>>,
    internal_tx: mpsc::Sender<InternalEvent>,
    internal_rx: Option<mpsc::Receiver<InternalEvent>>,
    update_tx: mpsc::Sender<SessionUpdate>,
    close_delay: Duration,
}

impl SessionController {
    /// Performs the startup capability check and builds the controller.
    ///
    /// Fails — terminally for the session — when the config does not
    /// validate, the host reports no user id, or the adapter factory
    /// errors. An *empty* adapter list is not an error.
    pub fn new(
        provider: &dyn ConfigProvider,
        host: Box<dyn HostBridge>,
        factory: &dyn AdapterFactory,
        update_tx: mpsc::Sender<SessionUpdate>,
    ) -> Result<Self> {
        let config = provider.load()?;

        let user_id = host.user_id().ok_or_else(|| SolgateError::HostError {
            reason: "host reports no user id; launch from Telegram".into(),
        })?;

        let adapters = usable(factory.discover()?);

        let backend = HttpVerifier::new(config.backend_api_url.clone())?;

        tracing::info!(
            backend = %config.backend_api_url,
            network = %config.solana_network,
            rpc = config.solana_network.rpc_endpoint(),
            adapters = adapters.len(),
            "session configured"
        );

        let (adapter_tx, adapter_rx) = mpsc::channel(ADAPTER_CHANNEL_SIZE);
        let (internal_tx, internal_rx) = mpsc::channel(INTERNAL_CHANNEL_SIZE);

        Ok(Self {
            session: Session::new(user_id),
            adapters,
            host,
            backend: Arc::new(backend),
            adapter_tx,
            adapter_rx: Some(adapter_rx),
            internal_tx,
            internal_rx: Some(internal_rx),
            update_tx,
            close_delay: CLOSE_DELAY,
        })
    }

    /// Replaces the verification backend (tests).
    pub fn with_backend(mut self, backend: Arc<dyn VerifyBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Overrides the post-verification close delay (tests).
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    // -----------------------------------------------------------------------
    // Run loop
    // -----------------------------------------------------------------------

    /// Runs the controller until the command sender drops.
    ///
    /// Never panics. All errors end as rendered view updates.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<SessionCommand>) {
        let (mut adapter_rx, mut internal_rx) =
            match (self.adapter_rx.take(), self.internal_rx.take()) {
                (Some(a), Some(i)) => (a, i),
                _ => return,
            };

        self.host.ready();
        self.host.expand();
        tracing::info!(user_id = %self.session.user_id, "session started");
        self.push_view();

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(command) => self.handle_command(command),
                        None => {
                            // UI dropped the sender — exit.
                            break;
                        }
                    }
                }
                Some(event) = adapter_rx.recv() => {
                    self.handle_adapter_event(event);
                }
                Some(event) = internal_rx.recv() => {
                    self.handle_internal(event);
                }
            }
        }

        tracing::info!("session loop exited");
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Renders the session and pushes the view to the UI.
    fn push_view(&self) {
        let names: Vec<String> = self
            .adapters
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        let _ = self
            .update_tx
            .try_send(SessionUpdate::View(view(&self.session, &names)));
    }

    // -----------------------------------------------------------------------
    // Command dispatch
    // -----------------------------------------------------------------------

    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Connect { adapter } => self.connect(adapter),
            SessionCommand::Disconnect => self.disconnect(),
            SessionCommand::Verify => self.verify(),
        }
    }

    /// Binds the chosen adapter and initiates its connect.
    ///
    /// Only one connect attempt may be in flight: a request while
    /// connecting or already connected is a no-op.
    fn connect(&mut self, index: usize) {
        if self.session.phase != SessionPhase::Disconnected {
            tracing::debug!(phase = %self.session.phase, "connect ignored");
            return;
        }
        if index >= self.adapters.len() {
            tracing::warn!(index, "connect requested for unknown adapter");
            return;
        }

        // Ownership transfer: release the previous adapter's binding
        // before the new one gets the channel.
        if let Some(prev) = self.session.active.take() {
            if let Some(adapter) = self.adapters.get_mut(prev) {
                adapter.unbind();
            }
        }

        let events = self.adapter_tx.clone();
        self.adapters[index].bind(events);
        self.session.active = Some(index);
        self.session.phase = SessionPhase::Connecting;
        self.session.last_error = None;
        tracing::info!(adapter = self.adapters[index].name(), "connect requested");
        self.push_view();

        if let Err(e) = self.adapters[index].connect() {
            tracing::warn!(
                adapter = self.adapters[index].name(),
                error = %e,
                "connect initiation failed"
            );
            self.adapters[index].unbind();
            self.session.reset(Some(format!("Failed to connect: {e}")));
            self.push_view();
        }
    }

    /// Disconnects the active wallet.
    ///
    /// Adapter errors are swallowed: returning to disconnected *is* the
    /// recovery, so disconnect must never leave the session stuck.
    fn disconnect(&mut self) {
        if let Some(index) = self.session.active {
            if let Some(adapter) = self.adapters.get_mut(index) {
                if let Err(e) = adapter.disconnect() {
                    tracing::warn!(
                        adapter = adapter.name(),
                        error = %e,
                        "disconnect failed; forcing disconnected state"
                    );
                }
                adapter.unbind();
            }
        }
        self.session.reset(None);
        self.push_view();
    }

    /// Starts one verification round trip.
    fn verify(&mut self) {
        if !matches!(
            self.session.phase,
            SessionPhase::Connected | SessionPhase::Failed
        ) {
            tracing::debug!(phase = %self.session.phase, "verify ignored");
            return;
        }

        // Local validation: both prerequisites must be present before
        // any network traffic happens.
        let Some(address) = self.session.connected_address.clone() else {
            self.session.phase = SessionPhase::Failed;
            self.session.failure = Some(VerifyFailure::Rejected {
                message: "wallet not connected".into(),
            });
            self.push_view();
            return;
        };

        let user_id = self.session.user_id;
        let epoch = self.session.epoch();
        self.session.phase = SessionPhase::Verifying;
        self.session.failure = None;
        tracing::info!(address = %address, "verification requested");
        self.push_view();

        let request = self.backend.submit(user_id, address);
        let internal = self.internal_tx.clone();
        tokio::spawn(async move {
            let outcome = request.await;
            let _ = internal
                .send(InternalEvent::VerifyDone { epoch, outcome })
                .await;
        });
    }

    // -----------------------------------------------------------------------
    // Adapter events
    // -----------------------------------------------------------------------

    fn handle_adapter_event(&mut self, event: AdapterEvent) {
        // Events must come from the adapter that currently holds the
        // binding; anything else is a leftover from a superseded state.
        let Some(index) = self.session.active else {
            tracing::debug!(adapter = event.adapter(), "event with no active adapter ignored");
            return;
        };
        if self.adapters.get(index).map(|a| a.name()) != Some(event.adapter()) {
            tracing::debug!(adapter = event.adapter(), "event from superseded adapter ignored");
            return;
        }

        match event {
            AdapterEvent::Pairing { url, .. } => {
                self.session.pairing_url = Some(url);
                self.push_view();
            }

            AdapterEvent::Connected { address, .. } => {
                // The event contract comes from external wallet
                // plumbing; re-check the adapter actually has a key.
                if self.adapters[index].public_key().is_none() {
                    tracing::warn!(
                        adapter = self.adapters[index].name(),
                        "connect event without a public key; treating as disconnect"
                    );
                    self.force_disconnect(index, None);
                    return;
                }
                tracing::info!(
                    adapter = self.adapters[index].name(),
                    address = %address,
                    "wallet connected"
                );
                self.session.mark_connected(address);
                self.push_view();
            }

            AdapterEvent::ConnectFailed { reason, .. } => {
                if self.session.phase != SessionPhase::Connecting {
                    tracing::debug!(reason = %reason, "late connect failure ignored");
                    return;
                }
                tracing::warn!(
                    adapter = self.adapters[index].name(),
                    reason = %reason,
                    "connect failed"
                );
                self.force_disconnect(index, Some(format!("Failed to connect: {reason}")));
            }

            AdapterEvent::Disconnected { .. } => {
                tracing::info!(adapter = self.adapters[index].name(), "wallet disconnected");
                self.force_disconnect(index, None);
            }
        }
    }

    /// Unbinds the adapter and resets the session, whatever the phase.
    fn force_disconnect(&mut self, index: usize, error: Option<String>) {
        if let Some(adapter) = self.adapters.get_mut(index) {
            adapter.unbind();
        }
        self.session.reset(error);
        self.push_view();
    }

    // -----------------------------------------------------------------------
    // Internal events
    // -----------------------------------------------------------------------

    fn handle_internal(&mut self, event: InternalEvent) {
        match event {
            InternalEvent::VerifyDone { epoch, outcome } => {
                // A response for a superseded session must not
                // resurrect a stale phase.
                if epoch != self.session.epoch()
                    || self.session.phase != SessionPhase::Verifying
                {
                    tracing::debug!("stale verification response dropped");
                    return;
                }

                match outcome {
                    VerifyOutcome::Passed => {
                        tracing::info!("verification passed");
                        self.session.phase = SessionPhase::Verified;
                        self.push_view();

                        let internal = self.internal_tx.clone();
                        let delay = self.close_delay;
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = internal.send(InternalEvent::CloseDue { epoch }).await;
                        });
                    }
                    VerifyOutcome::Failed(failure) => {
                        tracing::warn!(failure = %failure, "verification failed");
                        self.session.phase = SessionPhase::Failed;
                        self.session.failure = Some(failure);
                        self.push_view();
                    }
                }
            }

            InternalEvent::CloseDue { epoch } => {
                if epoch == self.session.epoch()
                    && self.session.phase == SessionPhase::Verified
                {
                    self.host.close();
                    let _ = self.update_tx.try_send(SessionUpdate::Closed);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Builds and runs a session. Call from a tokio runtime.
///
/// Fatal startup errors (missing config, missing user id, broken wallet
/// plumbing) are rendered as a terminal view instead of propagating.
pub async fn run_session(
    provider: &dyn ConfigProvider,
    host: Box<dyn HostBridge>,
    factory: &dyn AdapterFactory,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    update_tx: mpsc::Sender<SessionUpdate>,
) {
    match SessionController::new(provider, host, factory, update_tx.clone()) {
        Ok(controller) => controller.run(cmd_rx).await,
        Err(e) => {
            tracing::error!(error = %e, "fatal startup error");
            let _ = update_tx.try_send(SessionUpdate::View(fatal_view(&e.to_string())));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
