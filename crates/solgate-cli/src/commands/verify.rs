//! The headless connect + verify flow.

use std::time::Duration;

use clap::Args;
use tokio::time::timeout;

use solgate_session::controller::{
    create_channels, run_session, SessionCommand, SessionUpdate,
};
use solgate_session::view::{Control, GateView};
use solgate_types::SessionPhase;

use crate::output;
use crate::GlobalOpts;

#[derive(Args)]
pub struct VerifyArgs {
    /// Adapter to connect (by name, case-insensitive). Defaults to the
    /// first discovered one.
    #[arg(long)]
    pub adapter: Option<String>,

    /// Overall timeout in seconds (pairing approval included).
    #[arg(long, default_value = "180")]
    pub timeout: u64,
}

/// Picks the adapter index matching the requested name.
pub fn select_adapter(names: &[String], requested: Option<&str>) -> Option<usize> {
    match requested {
        Some(wanted) => names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(wanted)),
        None => {
            if names.is_empty() {
                None
            } else {
                Some(0)
            }
        }
    }
}

/// Adapter names extracted from a disconnected view's controls.
fn adapter_names(view: &GateView) -> Vec<String> {
    view.controls
        .iter()
        .filter_map(|c| match c {
            Control::ConnectAdapter { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

pub async fn run(args: &VerifyArgs, opts: &GlobalOpts) -> std::result::Result<(), String> {
    let provider = opts.build_provider();
    let factory = opts.build_factory();
    let host = opts.build_host().map_err(|e| e.to_string())?;

    let (cmd_tx, cmd_rx, update_tx, mut update_rx) = create_channels();

    let session = tokio::spawn(async move {
        run_session(provider.as_ref(), Box::new(host), factory.as_ref(), cmd_rx, update_tx)
            .await;
    });

    let deadline = Duration::from_secs(args.timeout);
    let started = std::time::Instant::now();

    let mut connect_sent = false;
    let mut verify_sent = false;
    let mut pairing_shown = false;

    let result = loop {
        let remaining = deadline
            .checked_sub(started.elapsed())
            .ok_or_else(|| "timed out waiting for verification".to_string())?;

        let update = match timeout(remaining, update_rx.recv()).await {
            Ok(Some(update)) => update,
            Ok(None) => break Err("session ended unexpectedly".to_string()),
            Err(_) => break Err("timed out waiting for verification".to_string()),
        };

        let view = match update {
            SessionUpdate::View(view) => view,
            SessionUpdate::Closed => break Ok(()),
        };

        if view.terminal {
            break Err(view
                .detail
                .unwrap_or_else(|| "startup failed".to_string()));
        }

        if let Some(url) = &view.pairing_url {
            if !pairing_shown {
                pairing_shown = true;
                output::print_info(
                    &format!("Approve the connection in your wallet: {url}"),
                    opts.json,
                );
            }
        }

        match view.phase {
            SessionPhase::Disconnected => {
                if connect_sent {
                    // We already tried: this is the failure report.
                    break Err(view
                        .detail
                        .unwrap_or_else(|| "wallet disconnected".to_string()));
                }
                let names = adapter_names(&view);
                let Some(index) = select_adapter(&names, args.adapter.as_deref()) else {
                    break Err(match &args.adapter {
                        Some(wanted) => format!("no adapter named {wanted:?} (available: {names:?})"),
                        None => "no compatible wallets detected".to_string(),
                    });
                };
                output::print_info(&format!("Connecting {}...", names[index]), opts.json);
                connect_sent = true;
                cmd_tx
                    .try_send(SessionCommand::Connect { adapter: index })
                    .map_err(|e| format!("session busy: {e}"))?;
            }

            SessionPhase::Connected => {
                if !verify_sent {
                    if let Some(address) = &view.address {
                        output::print_info(&format!("Connected: {address}"), opts.json);
                    }
                    output::print_info("Verifying NFT holdings...", opts.json);
                    verify_sent = true;
                    cmd_tx
                        .try_send(SessionCommand::Verify)
                        .map_err(|e| format!("session busy: {e}"))?;
                }
            }

            SessionPhase::Verified => {
                break Ok(());
            }

            SessionPhase::Failed => {
                let mut message = view
                    .detail
                    .unwrap_or_else(|| "verification failed".to_string());
                if let Some(url) = &view.purchase_url {
                    message.push_str(&format!(" Purchase: {url}"));
                }
                break Err(message);
            }

            SessionPhase::Connecting | SessionPhase::Verifying => {}
        }
    };

    // Dropping the command sender shuts the controller down.
    drop(cmd_tx);
    let _ = timeout(Duration::from_secs(2), session).await;

    match result {
        Ok(()) => {
            output::print_success("Verification complete. Access granted.", opts.json);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Phantom".into(), "Solflare".into()]
    }

    #[test]
    fn defaults_to_first_adapter() {
        assert_eq!(select_adapter(&names(), None), Some(0));
    }

    #[test]
    fn matches_requested_name_case_insensitively() {
        assert_eq!(select_adapter(&names(), Some("solflare")), Some(1));
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(select_adapter(&names(), Some("Ledger")), None);
    }

    #[test]
    fn empty_list_is_none() {
        assert_eq!(select_adapter(&[], None), None);
    }
}
