//! The single gate view: wallet buttons, status, verification controls.
//!
//! Pure projection of the [`GateView`] model — all texts, control
//! availability, and phase logic come from the session crate; this
//! module only draws and forwards clicks.

use eframe::egui;
use tokio::sync::mpsc;

use solgate_session::controller::SessionCommand;
use solgate_session::view::{Control, GateView};
use solgate_types::SessionPhase;

use crate::theme;

/// Renders the gate view and forwards control clicks to the session.
pub fn render(view: &GateView, cmd_tx: &mpsc::Sender<SessionCommand>, ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(theme::SECTION_SPACING);
        ui.label(theme::header("Solgate"));
        ui.add_space(2.0);
        ui.label(theme::muted("NFT access verification"));
        ui.add_space(theme::SECTION_SPACING);

        // Fatal startup: a blocking message, nothing interactive.
        if view.terminal {
            ui.colored_label(theme::DANGER, theme::body(&view.status));
            if let Some(detail) = &view.detail {
                ui.add_space(theme::ITEM_SPACING);
                ui.colored_label(theme::DANGER, theme::body(detail));
            }
            return;
        }

        ui.label(theme::body(&view.status));

        if let Some(address) = &view.address {
            ui.label(
                egui::RichText::new(theme::short_address(address))
                    .size(theme::FONT_SMALL)
                    .monospace(),
            );
        }

        if let Some(url) = &view.pairing_url {
            ui.add_space(theme::ITEM_SPACING);
            ui.label(theme::muted("Approve the connection in your wallet:"));
            ui.hyperlink(url);
        }

        if view.busy {
            ui.add_space(theme::ITEM_SPACING);
            ui.spinner();
        }

        if let Some(detail) = &view.detail {
            ui.add_space(theme::SECTION_SPACING);
            let color = match view.phase {
                SessionPhase::Verified => theme::SUCCESS,
                SessionPhase::Failed => theme::DANGER,
                SessionPhase::Disconnected => theme::DANGER,
                _ => theme::TEXT_MUTED,
            };
            ui.colored_label(color, theme::body(detail));
        }

        if let Some(url) = &view.purchase_url {
            ui.add_space(theme::ITEM_SPACING);
            ui.hyperlink_to("Buy on Magic Eden", url);
        }

        ui.add_space(theme::SECTION_SPACING);

        for control in &view.controls {
            match control {
                Control::ConnectAdapter { index, name } => {
                    if theme::accent_button(ui, &format!("Connect {name}")).clicked() {
                        let _ = cmd_tx.try_send(SessionCommand::Connect { adapter: *index });
                    }
                }
                Control::Verify => {
                    if theme::accent_button(ui, "Verify Holdings").clicked() {
                        let _ = cmd_tx.try_send(SessionCommand::Verify);
                    }
                }
                Control::Retry => {
                    if theme::accent_button(ui, "Retry Verification").clicked() {
                        let _ = cmd_tx.try_send(SessionCommand::Verify);
                    }
                }
                Control::Disconnect => {
                    if theme::danger_button(ui, "Disconnect").clicked() {
                        let _ = cmd_tx.try_send(SessionCommand::Disconnect);
                    }
                }
            }
            ui.add_space(theme::ITEM_SPACING);
        }
    });
}
