//! Core shared types for the Solgate NFT gate client.
//!
//! This crate defines all fundamental types used across the workspace.
//! No other crate should define shared types — everything lives here.

pub mod config;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// WalletAddress
// ---------------------------------------------------------------------------

/// Base58-encoded Solana public key.
///
/// The externally visible account identifier of a connected wallet.
/// Stored in its canonical base58 string form; construction validates
/// that the string decodes to exactly 32 bytes.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The decoded byte length of a Solana public key.
    pub const LEN: usize = 32;

    /// Creates a validated `WalletAddress` from a base58 string.
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        let bytes = bs58::decode(&s)
            .into_vec()
            .map_err(|e| SolgateError::InvalidAddress {
                reason: format!("invalid base58 encoding: {e}"),
            })?;
        if bytes.len() != Self::LEN {
            return Err(SolgateError::InvalidAddress {
                reason: format!("expected {} bytes, got {}", Self::LEN, bytes.len()),
            });
        }
        Ok(Self(s))
    }

    /// Returns the base58 string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = SolgateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// TelegramUserId
// ---------------------------------------------------------------------------

/// Opaque numeric identifier of the Telegram user who launched the
/// Mini-App. Resolved once at startup; verification may not be
/// attempted while it is absent.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TelegramUserId(i64);

impl TelegramUserId {
    /// Creates a new `TelegramUserId`.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric identifier.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TelegramUserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TelegramUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TelegramUserId {
    type Err = SolgateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let id: i64 = s.parse().map_err(|_| SolgateError::HostError {
            reason: format!("invalid Telegram user id: {s:?}"),
        })?;
        Ok(Self(id))
    }
}

// ---------------------------------------------------------------------------
// SolanaNetwork
// ---------------------------------------------------------------------------

/// Solana cluster the connected wallet is expected to operate on.
///
/// Carried in the configuration and logged at startup; the actual RPC
/// traffic belongs to the wallet libraries and the backend, not to this
/// client.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolanaNetwork {
    MainnetBeta,
    Devnet,
    Testnet,
}

impl SolanaNetwork {
    /// Public RPC endpoint of the cluster.
    pub fn rpc_endpoint(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
        }
    }
}

impl fmt::Display for SolanaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainnetBeta => write!(f, "mainnet-beta"),
            Self::Devnet => write!(f, "devnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for SolanaNetwork {
    type Err = SolgateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(SolgateError::ConfigError {
                reason: format!("unknown Solana network: {other:?}"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Phase of the wallet-connect/verify session.
///
/// The session starts in `Disconnected` and is mutated only by the
/// session controller in response to adapter events or backend
/// responses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No wallet bound; adapter pick list is shown.
    Disconnected,
    /// Connect initiated; waiting for the adapter's connect event.
    Connecting,
    /// Wallet connected with a valid address; verification available.
    Connected,
    /// Verification request in flight.
    Verifying,
    /// Backend confirmed the holdings; session is about to close.
    Verified,
    /// Backend rejected the holdings or an error occurred; retry allowed.
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Verifying => write!(f, "verifying"),
            Self::Verified => write!(f, "verified"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// VerifyFailure
// ---------------------------------------------------------------------------

/// Structured outcome of a failed verification attempt.
///
/// Distinguishes the backend's "not enough NFTs" answer (which carries
/// a required count and an optional purchase link) from generic
/// rejections and transport-level failures. All variants are
/// retry-eligible.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum VerifyFailure {
    /// The wallet does not hold enough NFTs from the gated collection.
    InsufficientNfts {
        /// Minimum number of NFTs the backend requires, if reported.
        required: Option<u32>,
        /// Marketplace link where the NFTs can be purchased.
        purchase_url: Option<String>,
    },
    /// The backend rejected the request with an error message.
    Rejected {
        /// Backend-supplied error message or HTTP status description.
        message: String,
    },
    /// The request never produced a structured response.
    Transport {
        /// Underlying transport error, for logs only.
        message: String,
    },
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientNfts { required, .. } => match required {
                Some(n) => write!(f, "insufficient NFTs (need {n})"),
                None => write!(f, "insufficient NFTs"),
            },
            Self::Rejected { message } => write!(f, "rejected: {message}"),
            Self::Transport { message } => write!(f, "transport failure: {message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// HostBridge trait
// ---------------------------------------------------------------------------

/// The embedding chat-application's in-page API.
///
/// Supplies the invoking user's identity and window lifecycle controls.
/// The concrete Telegram implementation lives in `solgate-telegram`;
/// this trait lives here so the session controller can consume any
/// host without a dependency on the Telegram crate.
pub trait HostBridge: Send {
    /// The user identifier reported by the host, if any.
    fn user_id(&self) -> Option<TelegramUserId>;
    /// Signals the host that the app finished loading.
    fn ready(&mut self);
    /// Asks the host to expand the app to full height.
    fn expand(&mut self);
    /// Asks the host to close the app window.
    fn close(&mut self);
}

// ---------------------------------------------------------------------------
// SolgateError
// ---------------------------------------------------------------------------

/// Central error type for the Solgate client.
///
/// All crates in the workspace convert their internal errors into
/// variants of this enum, ensuring a unified error handling surface.
#[derive(Debug, Error)]
pub enum SolgateError {
    /// A configuration value is invalid or missing.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },

    /// The host runtime bridge is missing or incomplete.
    #[error("host error: {reason}")]
    HostError {
        /// Human-readable description of the host failure.
        reason: String,
    },

    /// A wallet adapter operation failed.
    #[error("adapter error: {reason}")]
    AdapterError {
        /// Human-readable description of the adapter failure.
        reason: String,
    },

    /// The provided wallet address is malformed.
    #[error("invalid address: {reason}")]
    InvalidAddress {
        /// Human-readable description of why the address is invalid.
        reason: String,
    },

    /// The verification request could not be issued.
    #[error("verify error: {reason}")]
    VerifyError {
        /// Human-readable description of the verification failure.
        reason: String,
    },

    /// A network or HTTP transport operation failed.
    #[error("transport error: {reason}")]
    TransportError {
        /// Human-readable description of the transport failure.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`SolgateError`].
pub type Result<T> = std::result::Result<T, SolgateError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // 32 bytes of 0x01 in base58.
    const VALID_ADDRESS: &str = "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi";

    #[test]
    fn wallet_address_accepts_valid_base58() -> Result<()> {
        let addr = WalletAddress::new(VALID_ADDRESS)?;
        assert_eq!(addr.as_str(), VALID_ADDRESS);
        Ok(())
    }

    #[test]
    fn wallet_address_rejects_bad_encoding() {
        // '0', 'I', 'O', 'l' are not in the base58 alphabet.
        let result = WalletAddress::new("0OIl");
        assert!(result.is_err());
    }

    #[test]
    fn wallet_address_rejects_wrong_length() {
        // Valid base58, but decodes to far fewer than 32 bytes.
        let result = WalletAddress::new("abcd");
        assert!(result.is_err());
    }

    #[test]
    fn wallet_address_roundtrip_display() -> Result<()> {
        let addr: WalletAddress = VALID_ADDRESS.parse()?;
        assert_eq!(addr.to_string(), VALID_ADDRESS);
        Ok(())
    }

    #[test]
    fn wallet_address_serde_is_plain_string() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let addr = WalletAddress::new(VALID_ADDRESS)?;
        let json = serde_json::to_string(&addr)?;
        assert_eq!(json, format!("\"{VALID_ADDRESS}\""));
        Ok(())
    }

    #[test]
    fn telegram_user_id_parses() -> Result<()> {
        let id: TelegramUserId = "123456789".parse()?;
        assert_eq!(id.as_i64(), 123_456_789);
        Ok(())
    }

    #[test]
    fn telegram_user_id_rejects_garbage() {
        let result: Result<TelegramUserId> = "not-a-number".parse();
        assert!(result.is_err());
    }

    #[test]
    fn network_display_and_parse() -> Result<()> {
        assert_eq!(SolanaNetwork::MainnetBeta.to_string(), "mainnet-beta");
        assert_eq!(SolanaNetwork::Devnet.to_string(), "devnet");
        let parsed: SolanaNetwork = "mainnet-beta".parse()?;
        assert_eq!(parsed, SolanaNetwork::MainnetBeta);
        Ok(())
    }

    #[test]
    fn network_rejects_unknown() {
        let result: Result<SolanaNetwork> = "ropsten".parse();
        assert!(result.is_err());
    }

    #[test]
    fn network_rpc_endpoints() {
        assert_eq!(
            SolanaNetwork::MainnetBeta.rpc_endpoint(),
            "https://api.mainnet-beta.solana.com"
        );
        assert_eq!(
            SolanaNetwork::Devnet.rpc_endpoint(),
            "https://api.devnet.solana.com"
        );
    }

    #[test]
    fn network_serde_kebab_case() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&SolanaNetwork::MainnetBeta)?;
        assert_eq!(json, "\"mainnet-beta\"");
        let parsed: SolanaNetwork = serde_json::from_str("\"devnet\"")?;
        assert_eq!(parsed, SolanaNetwork::Devnet);
        Ok(())
    }

    #[test]
    fn phase_display() {
        assert_eq!(SessionPhase::Disconnected.to_string(), "disconnected");
        assert_eq!(SessionPhase::Verifying.to_string(), "verifying");
        assert_eq!(SessionPhase::Verified.to_string(), "verified");
    }

    #[test]
    fn verify_failure_display_includes_required_count() {
        let failure = VerifyFailure::InsufficientNfts {
            required: Some(3),
            purchase_url: None,
        };
        assert!(failure.to_string().contains('3'));
    }

    #[test]
    fn error_display() {
        let err = SolgateError::ConfigError {
            reason: "backend URL missing".into(),
        };
        assert!(err.to_string().contains("backend URL missing"));
    }
}
