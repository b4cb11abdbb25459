//! Application configuration and the pluggable config-provider strategies.
//!
//! Deployments disagree on how the backend URL should be chosen (fixed
//! production URL, environment switch, internal hostname), so no single
//! policy is hard-coded here: the session controller consumes a
//! [`ConfigProvider`] and callers pick a strategy (or a chain of them).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, SolanaNetwork, SolgateError};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Production verification endpoint.
pub const PRODUCTION_BACKEND_API_URL: &str = "https://api.solgate.app/api/v1/verify-nft";

/// Environment variable naming the backend endpoint.
pub const BACKEND_URL_VAR: &str = "SOLGATE_BACKEND_URL";

/// Environment variable naming the Solana network.
pub const NETWORK_VAR: &str = "SOLGATE_NETWORK";

/// Template markers that indicate an unconfigured deployment. A URL
/// containing any of these is rejected before the first request is made.
const PLACEHOLDER_MARKERS: &[&str] = &["YOUR_", "_HERE", "-xxxx"];

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Resolved application configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute HTTPS URL of the verification backend endpoint.
    pub backend_api_url: String,

    /// Solana cluster the wallet is expected to operate on.
    pub solana_network: SolanaNetwork,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_api_url: PRODUCTION_BACKEND_API_URL.into(),
            solana_network: SolanaNetwork::MainnetBeta,
        }
    }
}

impl AppConfig {
    /// Validates the configuration values.
    ///
    /// The backend URL must be an absolute HTTPS URL and must not carry
    /// an unreplaced deployment template marker.
    pub fn validate(&self) -> Result<()> {
        if self.backend_api_url.is_empty() {
            return Err(SolgateError::ConfigError {
                reason: "backend_api_url must not be empty".into(),
            });
        }

        if !self.backend_api_url.starts_with("https://") {
            return Err(SolgateError::ConfigError {
                reason: format!(
                    "backend_api_url must be an absolute HTTPS URL, got {:?}",
                    self.backend_api_url
                ),
            });
        }

        for marker in PLACEHOLDER_MARKERS {
            if self.backend_api_url.contains(marker) {
                return Err(SolgateError::ConfigError {
                    reason: "backend_api_url has not been configured (template marker present)"
                        .into(),
                });
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ConfigProvider trait
// ---------------------------------------------------------------------------

/// Strategy supplying the configuration at startup.
///
/// Every provider validates before returning, so a successful `load`
/// always yields a usable config.
pub trait ConfigProvider: Send + Sync {
    /// Loads and validates the configuration.
    fn load(&self) -> Result<AppConfig>;
}

// ---------------------------------------------------------------------------
// StaticConfig
// ---------------------------------------------------------------------------

/// Fixed, compiled-in configuration.
pub struct StaticConfig {
    config: AppConfig,
}

impl StaticConfig {
    /// Creates a provider around an explicit config.
    pub fn new(backend_api_url: impl Into<String>, solana_network: SolanaNetwork) -> Self {
        Self {
            config: AppConfig {
                backend_api_url: backend_api_url.into(),
                solana_network,
            },
        }
    }

    /// The production configuration.
    pub fn production() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }
}

impl ConfigProvider for StaticConfig {
    fn load(&self) -> Result<AppConfig> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

// ---------------------------------------------------------------------------
// EnvConfig
// ---------------------------------------------------------------------------

/// Configuration from environment variables.
///
/// Reads [`BACKEND_URL_VAR`] (required) and [`NETWORK_VAR`] (optional,
/// defaults to mainnet-beta).
pub struct EnvConfig {
    url_var: String,
    network_var: String,
}

impl EnvConfig {
    /// Provider reading the standard variable names.
    pub fn new() -> Self {
        Self {
            url_var: BACKEND_URL_VAR.into(),
            network_var: NETWORK_VAR.into(),
        }
    }

    /// Provider reading custom variable names.
    pub fn with_vars(url_var: impl Into<String>, network_var: impl Into<String>) -> Self {
        Self {
            url_var: url_var.into(),
            network_var: network_var.into(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider for EnvConfig {
    fn load(&self) -> Result<AppConfig> {
        let backend_api_url =
            std::env::var(&self.url_var).map_err(|_| SolgateError::ConfigError {
                reason: format!("environment variable {} is not set", self.url_var),
            })?;

        let solana_network = match std::env::var(&self.network_var) {
            Ok(s) => SolanaNetwork::from_str(&s)?,
            Err(_) => SolanaNetwork::MainnetBeta,
        };

        let config = AppConfig {
            backend_api_url,
            solana_network,
        };
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// FileConfig
// ---------------------------------------------------------------------------

/// On-disk JSON config file format. Both fields are optional so a
/// partial file falls back to defaults for the rest.
///
/// Example `config.json`:
/// ```json
/// {
///   "backend_api_url": "https://gate.example.org/api/v1/verify-nft",
///   "solana_network": "devnet"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    pub backend_api_url: Option<String>,
    pub solana_network: Option<SolanaNetwork>,
}

/// Configuration from a JSON file.
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    /// Provider reading the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Provider reading the platform default location.
    pub fn default_location() -> Self {
        Self {
            path: default_config_path(),
        }
    }

    /// The path this provider reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileConfig {
    fn load(&self) -> Result<AppConfig> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| SolgateError::ConfigError {
            reason: format!("failed to read config file {}: {e}", self.path.display()),
        })?;

        let file: ConfigFile =
            serde_json::from_str(&text).map_err(|e| SolgateError::ConfigError {
                reason: format!("invalid config JSON in {}: {e}", self.path.display()),
            })?;

        let config = AppConfig {
            backend_api_url: file
                .backend_api_url
                .unwrap_or_else(|| PRODUCTION_BACKEND_API_URL.into()),
            solana_network: file.solana_network.unwrap_or(SolanaNetwork::MainnetBeta),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Platform-specific default config file path.
pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("solgate").join("config.json");
    }
    PathBuf::from("solgate-config.json")
}

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Tries a sequence of providers in order, returning the first that
/// loads successfully. Used by the front-ends to prefer an explicit
/// config file over environment variables over the compiled-in default.
pub struct ChainConfig {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ChainConfig {
    /// Creates a chain from an ordered list of providers.
    pub fn new(providers: Vec<Box<dyn ConfigProvider>>) -> Self {
        Self { providers }
    }
}

impl ConfigProvider for ChainConfig {
    fn load(&self) -> Result<AppConfig> {
        let mut last_err = SolgateError::ConfigError {
            reason: "no config provider available".into(),
        };
        for provider in &self.providers {
            match provider.load() {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::debug!(error = %e, "config provider skipped");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.solana_network, SolanaNetwork::MainnetBeta);
    }

    #[test]
    fn empty_url_rejected() {
        let config = AppConfig {
            backend_api_url: String::new(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn http_url_rejected() {
        let config = AppConfig {
            backend_api_url: "http://gate.example.org/verify".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn placeholder_url_rejected() {
        let config = AppConfig {
            backend_api_url: "https://YOUR_BACKEND_URL_HERE/verify".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn static_provider_returns_config() -> Result<()> {
        let provider = StaticConfig::new(
            "https://gate.example.org/api/v1/verify-nft",
            SolanaNetwork::Devnet,
        );
        let config = provider.load()?;
        assert_eq!(config.solana_network, SolanaNetwork::Devnet);
        Ok(())
    }

    #[test]
    fn static_provider_validates() {
        let provider = StaticConfig::new("ftp://nope", SolanaNetwork::Devnet);
        assert!(provider.load().is_err());
    }

    #[test]
    fn env_provider_reads_variables() -> Result<()> {
        std::env::set_var("SOLGATE_TEST_URL_A", "https://gate.example.org/verify");
        std::env::set_var("SOLGATE_TEST_NET_A", "devnet");
        let provider = EnvConfig::with_vars("SOLGATE_TEST_URL_A", "SOLGATE_TEST_NET_A");
        let config = provider.load()?;
        assert_eq!(config.backend_api_url, "https://gate.example.org/verify");
        assert_eq!(config.solana_network, SolanaNetwork::Devnet);
        Ok(())
    }

    #[test]
    fn env_provider_defaults_network_to_mainnet() -> Result<()> {
        std::env::set_var("SOLGATE_TEST_URL_B", "https://gate.example.org/verify");
        let provider = EnvConfig::with_vars("SOLGATE_TEST_URL_B", "SOLGATE_TEST_NET_B_UNSET");
        let config = provider.load()?;
        assert_eq!(config.solana_network, SolanaNetwork::MainnetBeta);
        Ok(())
    }

    #[test]
    fn env_provider_missing_url_fails() {
        let provider = EnvConfig::with_vars("SOLGATE_TEST_URL_C_UNSET", "SOLGATE_TEST_NET_C");
        assert!(provider.load().is_err());
    }

    #[test]
    fn file_provider_reads_json() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&path)?;
        writeln!(
            f,
            r#"{{"backend_api_url": "https://gate.example.org/verify", "solana_network": "testnet"}}"#
        )?;

        let provider = FileConfig::new(&path);
        let config = provider.load()?;
        assert_eq!(config.backend_api_url, "https://gate.example.org/verify");
        assert_eq!(config.solana_network, SolanaNetwork::Testnet);
        Ok(())
    }

    #[test]
    fn file_provider_partial_file_uses_defaults(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"solana_network": "devnet"}"#)?;

        let provider = FileConfig::new(&path);
        let config = provider.load()?;
        assert_eq!(config.backend_api_url, PRODUCTION_BACKEND_API_URL);
        assert_eq!(config.solana_network, SolanaNetwork::Devnet);
        Ok(())
    }

    #[test]
    fn file_provider_missing_file_fails() {
        let provider = FileConfig::new("/nonexistent/solgate/config.json");
        assert!(provider.load().is_err());
    }

    #[test]
    fn file_provider_invalid_json_fails() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json")?;
        let provider = FileConfig::new(&path);
        assert!(provider.load().is_err());
        Ok(())
    }

    #[test]
    fn chain_returns_first_success() -> Result<()> {
        let chain = ChainConfig::new(vec![
            Box::new(FileConfig::new("/nonexistent/solgate/config.json")),
            Box::new(StaticConfig::new(
                "https://gate.example.org/verify",
                SolanaNetwork::MainnetBeta,
            )),
        ]);
        let config = chain.load()?;
        assert_eq!(config.backend_api_url, "https://gate.example.org/verify");
        Ok(())
    }

    #[test]
    fn chain_empty_fails() {
        let chain = ChainConfig::new(Vec::new());
        assert!(chain.load().is_err());
    }
}
