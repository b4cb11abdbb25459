//! Solgate CLI client.
//!
//! Drives the same session controller as the GUI, headlessly: connect
//! a wallet (relay pairing or a local development wallet), request
//! verification, print the result, exit non-zero on failure.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use solgate_types::config::{
    ChainConfig, ConfigProvider, EnvConfig, FileConfig, StaticConfig,
};
use solgate_types::{Result, SolanaNetwork, TelegramUserId, WalletAddress};
use solgate_telegram::TelegramHost;
use solgate_wallet::factory::{AdapterFactory, LocalFactory, RelayFactory};
use solgate_wallet::relay::{WalletVendor, DEFAULT_RELAY_URL};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Solgate — Solana NFT gate for Telegram.
#[derive(Parser)]
#[command(name = "solgate", version, about)]
struct Cli {
    /// Output in JSON format (no colors, machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Path to a JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verification backend endpoint (overrides config file and env).
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Solana network: mainnet-beta, devnet, or testnet.
    #[arg(long, global = true)]
    network: Option<SolanaNetwork>,

    /// Telegram user id (otherwise resolved from TELEGRAM_INIT_DATA /
    /// TELEGRAM_USER_ID).
    #[arg(long, global = true)]
    user_id: Option<i64>,

    /// Wallet-connect relay URL.
    #[arg(long, global = true)]
    relay_url: Option<String>,

    /// Use an in-process wallet with this address instead of relay
    /// pairing (development only).
    #[arg(long, global = true)]
    local_wallet: Option<WalletAddress>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect a wallet and verify NFT holdings against the backend.
    Verify(commands::verify::VerifyArgs),
    /// List the wallet adapters available in this build.
    Adapters,
    /// Show the resolved configuration.
    Config,
}

// ---------------------------------------------------------------------------
// Global options passed to every command handler
// ---------------------------------------------------------------------------

/// Shared options threaded into command handlers.
pub struct GlobalOpts {
    pub json: bool,
    pub config: Option<PathBuf>,
    pub backend_url: Option<String>,
    pub network: Option<SolanaNetwork>,
    pub user_id: Option<i64>,
    pub relay_url: Option<String>,
    pub local_wallet: Option<WalletAddress>,
}

impl GlobalOpts {
    /// Config strategy: explicit endpoint beats explicit file beats the
    /// default chain (file, then env, then compiled-in production).
    pub fn build_provider(&self) -> Box<dyn ConfigProvider> {
        if let Some(url) = &self.backend_url {
            return Box::new(StaticConfig::new(
                url.clone(),
                self.network.unwrap_or(SolanaNetwork::MainnetBeta),
            ));
        }
        if let Some(path) = &self.config {
            return Box::new(FileConfig::new(path.clone()));
        }
        Box::new(ChainConfig::new(vec![
            Box::new(FileConfig::default_location()),
            Box::new(EnvConfig::new()),
            Box::new(StaticConfig::production()),
        ]))
    }

    /// Adapter factory: a local development wallet when requested,
    /// relay pairing otherwise.
    pub fn build_factory(&self) -> Box<dyn AdapterFactory> {
        if let Some(address) = &self.local_wallet {
            return Box::new(LocalFactory::new("Local", address.clone()));
        }
        let relay_url = self
            .relay_url
            .clone()
            .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());
        Box::new(RelayFactory::new(
            relay_url,
            vec![WalletVendor::Phantom, WalletVendor::Solflare],
        ))
    }

    /// Host identity: explicit flag first, environment second.
    pub fn build_host(&self) -> Result<TelegramHost> {
        match self.user_id {
            Some(id) => Ok(TelegramHost::with_user_id(TelegramUserId::new(id))),
            None => TelegramHost::from_env(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let opts = GlobalOpts {
        json: cli.json,
        config: cli.config,
        backend_url: cli.backend_url,
        network: cli.network,
        user_id: cli.user_id,
        relay_url: cli.relay_url,
        local_wallet: cli.local_wallet,
    };

    let result = dispatch(&opts, cli.command).await;

    if let Err(e) = result {
        output::print_error(&e, opts.json);
        std::process::exit(1);
    }
}

async fn dispatch(opts: &GlobalOpts, cmd: Commands) -> std::result::Result<(), String> {
    match cmd {
        Commands::Verify(args) => commands::verify::run(&args, opts).await,
        Commands::Adapters => commands::adapters::run(opts).await,
        Commands::Config => commands::config::run(opts).await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
