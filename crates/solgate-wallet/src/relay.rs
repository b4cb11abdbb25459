//! Relay-backed wallet adapter.
//!
//! A native client cannot reach a browser-extension wallet directly, so
//! pairing goes through a rendezvous relay: create a session, surface
//! the pairing URL to the user, then poll until the wallet approves or
//! the attempt times out.
//!
//! Relay contract:
//! - `POST <relay>/session` with `{ "label": …, "wallet": … }` →
//!   `{ "session_id": … }`
//! - `GET <relay>/session/<id>` → `{ "connected": bool, "wallet": …? }`
//! - `DELETE <relay>/session/<id>` best-effort on disconnect.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use solgate_types::{Result, SolgateError, WalletAddress};

use crate::adapter::{AdapterEvent, WalletAdapter};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default rendezvous relay.
pub const DEFAULT_RELAY_URL: &str = "https://relay.solgate.app";

/// Interval between pairing status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long a pairing attempt may remain unanswered.
const PAIRING_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-request HTTP timeout against the relay.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// WalletVendor
// ---------------------------------------------------------------------------

/// Wallet vendors the relay can pair with.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum WalletVendor {
    Phantom,
    Solflare,
}

impl WalletVendor {
    /// Vendor name shown on the connect button.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Phantom => "Phantom",
            Self::Solflare => "Solflare",
        }
    }
}

impl fmt::Display for WalletVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Relay wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    label: &'a str,
    wallet: &'a str,
}

/// Response to session creation.
#[derive(Debug, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Response to a pairing status poll.
#[derive(Debug, Deserialize)]
pub struct PollSessionResponse {
    pub connected: bool,
    #[serde(default)]
    pub wallet: Option<String>,
}

/// Pairing URL the user opens (or scans) to approve the connection.
pub fn pairing_url(relay_url: &str, session_id: &str) -> String {
    format!("{}/pair/{}", relay_url.trim_end_matches('/'), session_id)
}

// ---------------------------------------------------------------------------
// RelayAdapter
// ---------------------------------------------------------------------------

/// Adapter pairing with a wallet through the rendezvous relay.
pub struct RelayAdapter {
    vendor: WalletVendor,
    relay_url: String,
    client: reqwest::Client,
    events: Option<mpsc::Sender<AdapterEvent>>,
    address: Arc<Mutex<Option<WalletAddress>>>,
    session_id: Arc<Mutex<Option<String>>>,
    poll_task: Option<JoinHandle<()>>,
}

impl RelayAdapter {
    /// Creates an adapter for one vendor against the given relay.
    pub fn new(vendor: WalletVendor, relay_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| SolgateError::TransportError {
                reason: format!("failed to build relay HTTP client: {e}"),
            })?;
        Ok(Self {
            vendor,
            relay_url: relay_url.into(),
            client,
            events: None,
            address: Arc::new(Mutex::new(None)),
            session_id: Arc::new(Mutex::new(None)),
            poll_task: None,
        })
    }
}

impl WalletAdapter for RelayAdapter {
    fn name(&self) -> &str {
        self.vendor.name()
    }

    fn public_key(&self) -> Option<WalletAddress> {
        self.address.lock().unwrap().clone()
    }

    fn bind(&mut self, events: mpsc::Sender<AdapterEvent>) {
        self.events = Some(events);
    }

    fn unbind(&mut self) {
        // Aborting the poll task guarantees a released binding can
        // never receive another event from this adapter.
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        self.events = None;
    }

    fn is_bound(&self) -> bool {
        self.events.is_some()
    }

    fn connect(&mut self) -> Result<()> {
        let Some(events) = self.events.clone() else {
            return Err(SolgateError::AdapterError {
                reason: format!("adapter {:?} is not bound", self.name()),
            });
        };

        // A live attempt is already pairing; let it finish.
        if let Some(task) = &self.poll_task {
            if !task.is_finished() {
                return Ok(());
            }
        }

        let vendor = self.vendor.name().to_string();
        let client = self.client.clone();
        let relay = self.relay_url.clone();
        let address_slot = Arc::clone(&self.address);
        let session_slot = Arc::clone(&self.session_id);

        self.poll_task = Some(tokio::spawn(async move {
            let session_id = match create_session(&client, &relay, &vendor).await {
                Ok(id) => id,
                Err(e) => {
                    let _ = events
                        .send(AdapterEvent::ConnectFailed {
                            adapter: vendor,
                            reason: e.to_string(),
                        })
                        .await;
                    return;
                }
            };
            *session_slot.lock().unwrap() = Some(session_id.clone());

            let _ = events
                .send(AdapterEvent::Pairing {
                    adapter: vendor.clone(),
                    url: pairing_url(&relay, &session_id),
                })
                .await;

            let deadline = tokio::time::Instant::now() + PAIRING_TIMEOUT;
            loop {
                tokio::time::sleep(POLL_INTERVAL).await;

                if tokio::time::Instant::now() >= deadline {
                    let _ = events
                        .send(AdapterEvent::ConnectFailed {
                            adapter: vendor,
                            reason: "pairing timed out".into(),
                        })
                        .await;
                    return;
                }

                match poll_session(&client, &relay, &session_id).await {
                    Ok(poll) if poll.connected => {
                        let raw = poll.wallet.unwrap_or_default();
                        match raw.parse::<WalletAddress>() {
                            Ok(addr) => {
                                *address_slot.lock().unwrap() = Some(addr.clone());
                                let _ = events
                                    .send(AdapterEvent::Connected {
                                        adapter: vendor,
                                        address: addr,
                                    })
                                    .await;
                            }
                            Err(e) => {
                                let _ = events
                                    .send(AdapterEvent::ConnectFailed {
                                        adapter: vendor,
                                        reason: format!("relay returned invalid address: {e}"),
                                    })
                                    .await;
                            }
                        }
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        // Transient relay failures are retried until the
                        // pairing deadline.
                        tracing::debug!(error = %e, "relay poll failed, retrying");
                    }
                }
            }
        }));

        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        *self.address.lock().unwrap() = None;

        // Best-effort session teardown on the relay.
        if let Some(session_id) = self.session_id.lock().unwrap().take() {
            let client = self.client.clone();
            let url = format!(
                "{}/session/{}",
                self.relay_url.trim_end_matches('/'),
                session_id
            );
            tokio::spawn(async move {
                if let Err(e) = client.delete(&url).send().await {
                    tracing::debug!(error = %e, "relay session teardown failed");
                }
            });
        }

        if let Some(events) = &self.events {
            let _ = events.try_send(AdapterEvent::Disconnected {
                adapter: self.vendor.name().to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Relay calls
// ---------------------------------------------------------------------------

async fn create_session(
    client: &reqwest::Client,
    relay_url: &str,
    vendor: &str,
) -> Result<String> {
    let url = format!("{}/session", relay_url.trim_end_matches('/'));
    let body = CreateSessionRequest {
        label: "solgate",
        wallet: vendor,
    };

    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| SolgateError::TransportError {
            reason: format!("relay unreachable: {e}"),
        })?;

    if !resp.status().is_success() {
        return Err(SolgateError::TransportError {
            reason: format!("relay returned status {}", resp.status()),
        });
    }

    let created: CreateSessionResponse =
        resp.json().await.map_err(|e| SolgateError::TransportError {
            reason: format!("invalid relay response: {e}"),
        })?;
    Ok(created.session_id)
}

async fn poll_session(
    client: &reqwest::Client,
    relay_url: &str,
    session_id: &str,
) -> Result<PollSessionResponse> {
    let url = format!(
        "{}/session/{}",
        relay_url.trim_end_matches('/'),
        session_id
    );

    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| SolgateError::TransportError {
            reason: format!("relay unreachable: {e}"),
        })?;

    if !resp.status().is_success() {
        return Err(SolgateError::TransportError {
            reason: format!("relay returned status {}", resp.status()),
        });
    }

    resp.json().await.map_err(|e| SolgateError::TransportError {
        reason: format!("invalid relay response: {e}"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_names() {
        assert_eq!(WalletVendor::Phantom.name(), "Phantom");
        assert_eq!(WalletVendor::Solflare.to_string(), "Solflare");
    }

    #[test]
    fn pairing_url_format() {
        assert_eq!(
            pairing_url("https://relay.example.org", "abc123"),
            "https://relay.example.org/pair/abc123"
        );
        // Trailing slash is normalized.
        assert_eq!(
            pairing_url("https://relay.example.org/", "abc123"),
            "https://relay.example.org/pair/abc123"
        );
    }

    #[test]
    fn create_session_response_decodes() -> std::result::Result<(), serde_json::Error> {
        let resp: CreateSessionResponse =
            serde_json::from_str(r#"{"session_id": "abc123"}"#)?;
        assert_eq!(resp.session_id, "abc123");
        Ok(())
    }

    #[test]
    fn poll_response_decodes_pending() -> std::result::Result<(), serde_json::Error> {
        let resp: PollSessionResponse = serde_json::from_str(r#"{"connected": false}"#)?;
        assert!(!resp.connected);
        assert!(resp.wallet.is_none());
        Ok(())
    }

    #[test]
    fn poll_response_decodes_connected() -> std::result::Result<(), serde_json::Error> {
        let resp: PollSessionResponse = serde_json::from_str(
            r#"{"connected": true, "wallet": "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi"}"#,
        )?;
        assert!(resp.connected);
        assert!(resp.wallet.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn relay_adapter_requires_binding() -> Result<()> {
        let mut adapter = RelayAdapter::new(WalletVendor::Phantom, DEFAULT_RELAY_URL)?;
        assert!(adapter.connect().is_err());
        assert!(!adapter.is_bound());
        Ok(())
    }
}
