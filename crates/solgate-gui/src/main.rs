//! Solgate GUI entry point.
//!
//! Architecture:
//!
//! ```text
//!                       ┌────────────────────────────────────────┐
//!                       │        tokio runtime (bg thread)       │
//!                       │                                        │
//!  ┌─────────────┐ cmd  │  ┌────────────────┐   ┌─────────────┐  │
//!  │  eframe UI  │ ───▶ │  │ session        │──▶│ verification │  │
//!  │ (main thread)│ ◀─── │  │ controller     │   │ backend      │  │
//!  └─────────────┘ view │  └────────────────┘   └─────────────┘  │
//!                       └────────────────────────────────────────┘
//! ```
//!
//! 1. The background runtime runs the session controller loop.
//! 2. The controller resolves config, host identity, and adapters.
//! 3. The UI renders every pushed view and forwards control clicks.

use eframe::egui;

use solgate_gui::app;
use solgate_session::controller::{create_channels, run_session};
use solgate_telegram::TelegramHost;
use solgate_types::config::{ChainConfig, ConfigProvider, EnvConfig, FileConfig, StaticConfig};
use solgate_types::HostBridge;
use solgate_wallet::factory::{AdapterFactory, RelayFactory};
use solgate_wallet::relay::{WalletVendor, DEFAULT_RELAY_URL};

/// Environment variable overriding the wallet-connect relay.
const RELAY_URL_VAR: &str = "SOLGATE_RELAY_URL";

/// Config file first, then environment, then the compiled-in default.
fn default_provider() -> Box<dyn ConfigProvider> {
    Box::new(ChainConfig::new(vec![
        Box::new(FileConfig::default_location()),
        Box::new(EnvConfig::new()),
        Box::new(StaticConfig::production()),
    ]))
}

/// Relay-backed adapters for the supported vendors.
fn default_factory() -> Box<dyn AdapterFactory> {
    let relay_url =
        std::env::var(RELAY_URL_VAR).unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
    Box::new(RelayFactory::new(
        relay_url,
        vec![WalletVendor::Phantom, WalletVendor::Solflare],
    ))
}

fn main() {
    // Initialize tracing (logs to stderr).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Solgate GUI starting");

    // Bounded channels for UI ↔ controller communication.
    let (cmd_tx, cmd_rx, update_tx, update_rx) = create_channels();

    // Spawn the tokio runtime in a dedicated background thread. It
    // owns the session controller and exits when the UI drops cmd_tx
    // on window close.
    std::thread::Builder::new()
        .name("solgate-runtime".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .thread_name("solgate-worker")
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("failed to create tokio runtime: {e}");
                    return;
                }
            };

            rt.block_on(async move {
                let provider = default_provider();
                let factory = default_factory();

                // A missing Telegram identity is surfaced by the
                // controller as a blocking startup error.
                let host: Box<dyn HostBridge> = match TelegramHost::from_env() {
                    Ok(host) => Box::new(host),
                    Err(e) => {
                        tracing::warn!(error = %e, "no Telegram identity");
                        Box::new(TelegramHost::detached())
                    }
                };

                run_session(provider.as_ref(), host, factory.as_ref(), cmd_rx, update_tx)
                    .await;
            });
            tracing::info!("session runtime exited");
        })
        .ok();

    // Configure eframe window: phone-shaped, like the Mini-App it mirrors.
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Solgate")
            .with_inner_size([420.0, 640.0])
            .with_min_inner_size([320.0, 480.0]),
        ..Default::default()
    };

    // Run the eframe app on the main thread (blocks until window closed).
    let result = eframe::run_native(
        "Solgate",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::GateApp::new(cc, cmd_tx, update_rx)))),
    );

    if let Err(e) = result {
        tracing::error!("eframe error: {e}");
    }

    tracing::info!("Solgate GUI exited");
}
