//! Deterministic in-process adapter for development and tests.
//!
//! Connects (or fails) immediately with a configured address, and can
//! be remote-controlled to simulate wallet-side disconnects and the
//! misbehaving-adapter cases the controller must survive.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use solgate_types::{Result, SolgateError, WalletAddress};

use crate::adapter::{AdapterEvent, WalletAdapter};

// ---------------------------------------------------------------------------
// LocalRemote
// ---------------------------------------------------------------------------

/// Handle for driving a [`LocalAdapter`] from outside the controller,
/// the way a real wallet drives its adapter from the extension side.
#[derive(Clone, Default)]
pub struct LocalRemote {
    inner: Arc<Mutex<RemoteInner>>,
}

#[derive(Default)]
struct RemoteInner {
    name: String,
    events: Option<mpsc::Sender<AdapterEvent>>,
}

impl LocalRemote {
    /// Whether the adapter currently holds a live event binding.
    pub fn is_bound(&self) -> bool {
        self.inner.lock().unwrap().events.is_some()
    }

    /// Emits a wallet-initiated disconnect event. Returns `false` if
    /// the adapter is not bound (the event has nowhere to go).
    pub fn emit_disconnected(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        match &inner.events {
            Some(tx) => tx
                .try_send(AdapterEvent::Disconnected {
                    adapter: inner.name.clone(),
                })
                .is_ok(),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// LocalAdapter
// ---------------------------------------------------------------------------

/// In-process adapter holding a fixed address.
pub struct LocalAdapter {
    name: String,
    address: Option<WalletAddress>,
    connected: bool,
    /// Deliver a `ConnectFailed` event instead of connecting.
    connect_failure: Option<String>,
    /// Refuse the connect call itself (synchronous failure path).
    connect_rejection: Option<String>,
    /// Fire the connect event but never expose a public key.
    ghost_connect: bool,
    /// Return an error from `disconnect` (the controller must swallow it).
    disconnect_failure: bool,
    events: Option<mpsc::Sender<AdapterEvent>>,
    remote: LocalRemote,
}

impl LocalAdapter {
    /// Adapter that connects immediately with the given address.
    pub fn new(name: impl Into<String>, address: WalletAddress) -> Self {
        let name = name.into();
        let remote = LocalRemote::default();
        remote.inner.lock().unwrap().name = name.clone();
        Self {
            name,
            address: Some(address),
            connected: false,
            connect_failure: None,
            connect_rejection: None,
            ghost_connect: false,
            disconnect_failure: false,
            events: None,
            remote,
        }
    }

    /// Remote-control handle. Clone it before boxing the adapter.
    pub fn remote(&self) -> LocalRemote {
        self.remote.clone()
    }

    /// Deliver a `ConnectFailed` event instead of connecting.
    pub fn with_connect_failure(mut self, reason: impl Into<String>) -> Self {
        self.connect_failure = Some(reason.into());
        self
    }

    /// Refuse the connect call synchronously.
    pub fn with_connect_rejection(mut self, reason: impl Into<String>) -> Self {
        self.connect_rejection = Some(reason.into());
        self
    }

    /// Fire the connect event without ever exposing a public key.
    pub fn with_ghost_connect(mut self) -> Self {
        self.ghost_connect = true;
        self
    }

    /// Return an error from `disconnect`.
    pub fn with_disconnect_failure(mut self) -> Self {
        self.disconnect_failure = true;
        self
    }
}

impl WalletAdapter for LocalAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn public_key(&self) -> Option<WalletAddress> {
        if self.connected && !self.ghost_connect {
            self.address.clone()
        } else {
            None
        }
    }

    fn bind(&mut self, events: mpsc::Sender<AdapterEvent>) {
        self.remote.inner.lock().unwrap().events = Some(events.clone());
        self.events = Some(events);
    }

    fn unbind(&mut self) {
        self.remote.inner.lock().unwrap().events = None;
        self.events = None;
    }

    fn is_bound(&self) -> bool {
        self.events.is_some()
    }

    fn connect(&mut self) -> Result<()> {
        let Some(events) = self.events.clone() else {
            return Err(SolgateError::AdapterError {
                reason: format!("adapter {:?} is not bound", self.name),
            });
        };

        if let Some(reason) = &self.connect_rejection {
            return Err(SolgateError::AdapterError {
                reason: reason.clone(),
            });
        }

        if let Some(reason) = &self.connect_failure {
            let _ = events.try_send(AdapterEvent::ConnectFailed {
                adapter: self.name.clone(),
                reason: reason.clone(),
            });
            return Ok(());
        }

        let Some(address) = self.address.clone() else {
            let _ = events.try_send(AdapterEvent::ConnectFailed {
                adapter: self.name.clone(),
                reason: "no local wallet address configured".into(),
            });
            return Ok(());
        };

        self.connected = true;
        let _ = events.try_send(AdapterEvent::Connected {
            adapter: self.name.clone(),
            address,
        });
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        if self.disconnect_failure {
            return Err(SolgateError::AdapterError {
                reason: format!("adapter {:?} failed to disconnect", self.name),
            });
        }
        if let Some(events) = &self.events {
            let _ = events.try_send(AdapterEvent::Disconnected {
                adapter: self.name.clone(),
            });
        }
        Ok(())
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

    #[tokio::test]
    async fn connect_delivers_event_and_exposes_key() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(8);
        let mut adapter = LocalAdapter::new("Phantom", address());

        adapter.bind(tx);
        adapter.connect()?;

        match rx.recv().await {
            Some(AdapterEvent::Connected { adapter: name, address: addr }) => {
                assert_eq!(name, "Phantom");
                assert_eq!(addr, address());
            }
            other => panic!("expected Connected, got {other:?}"),
        }
        assert_eq!(adapter.public_key(), Some(address()));
        Ok(())
    }

    #[tokio::test]
    async fn connect_without_binding_is_an_error() {
        let mut adapter = LocalAdapter::new("Phantom", address());
        assert!(adapter.connect().is_err());
    }

    #[tokio::test]
    async fn connect_failure_arrives_as_event() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(8);
        let mut adapter =
            LocalAdapter::new("Phantom", address()).with_connect_failure("user rejected");

        adapter.bind(tx);
        adapter.connect()?;

        match rx.recv().await {
            Some(AdapterEvent::ConnectFailed { reason, .. }) => {
                assert_eq!(reason, "user rejected");
            }
            other => panic!("expected ConnectFailed, got {other:?}"),
        }
        assert_eq!(adapter.public_key(), None);
        Ok(())
    }

    #[tokio::test]
    async fn ghost_connect_hides_public_key() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(8);
        let mut adapter = LocalAdapter::new("Phantom", address()).with_ghost_connect();

        adapter.bind(tx);
        adapter.connect()?;

        assert!(matches!(rx.recv().await, Some(AdapterEvent::Connected { .. })));
        assert_eq!(adapter.public_key(), None);
        Ok(())
    }

    #[tokio::test]
    async fn unbind_stops_remote_delivery() {
        let (tx, _rx) = mpsc::channel(8);
        let mut adapter = LocalAdapter::new("Phantom", address());
        let remote = adapter.remote();

        adapter.bind(tx);
        assert!(remote.is_bound());
        assert!(remote.emit_disconnected());

        adapter.unbind();
        assert!(!remote.is_bound());
        assert!(!remote.emit_disconnected());
    }

    #[tokio::test]
    async fn disconnect_failure_still_clears_connection() {
        let (tx, _rx) = mpsc::channel(8);
        let mut adapter = LocalAdapter::new("Phantom", address()).with_disconnect_failure();
        adapter.bind(tx);
        adapter.connect().unwrap();
        assert!(adapter.public_key().is_some());

        assert!(adapter.disconnect().is_err());
        assert_eq!(adapter.public_key(), None);
    }
}
