//! Application state and main update loop.
//!
//! The eframe app owns the latest [`GateView`] pushed by the session
//! controller and re-renders it every frame. Commands go back over the
//! bounded channel with `try_send` so the render loop never blocks.

use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use solgate_session::controller::{SessionCommand, SessionUpdate};
use solgate_session::view::GateView;
use solgate_types::SessionPhase;

use crate::theme;
use crate::views::gate;

// ---------------------------------------------------------------------------
// Toast notification
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

const TOAST_DURATION: Duration = Duration::from_secs(4);

// ---------------------------------------------------------------------------
// GateApp
// ---------------------------------------------------------------------------

pub struct GateApp {
    view: GateView,
    cmd_tx: mpsc::Sender<SessionCommand>,
    update_rx: mpsc::Receiver<SessionUpdate>,
    toasts: Vec<Toast>,
    closing: bool,
}

impl GateApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        cmd_tx: mpsc::Sender<SessionCommand>,
        update_rx: mpsc::Receiver<SessionUpdate>,
    ) -> Self {
        theme::apply_theme(&cc.egui_ctx);

        Self {
            view: startup_view(),
            cmd_tx,
            update_rx,
            toasts: Vec::new(),
            closing: false,
        }
    }

    // -----------------------------------------------------------------------
    // Event processing
    // -----------------------------------------------------------------------

    fn process_updates(&mut self) {
        loop {
            match self.update_rx.try_recv() {
                Ok(update) => self.handle_update(update),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => break,
            }
        }
    }

    fn handle_update(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::View(view) => {
                if view.phase == SessionPhase::Verified
                    && self.view.phase != SessionPhase::Verified
                {
                    self.add_toast("Verification complete", ToastLevel::Success);
                }
                if view.phase == SessionPhase::Failed && view.detail != self.view.detail {
                    if let Some(detail) = &view.detail {
                        self.add_toast(detail, ToastLevel::Error);
                    }
                }
                self.view = view;
            }
            SessionUpdate::Closed => {
                tracing::info!("session closed; shutting the window");
                self.add_toast("Closing...", ToastLevel::Info);
                self.closing = true;
            }
        }
    }

    fn add_toast(&mut self, msg: &str, level: ToastLevel) {
        self.toasts.push(Toast {
            message: msg.to_string(),
            level,
            created_at: Instant::now(),
        });
        if self.toasts.len() > 10 {
            self.toasts.remove(0);
        }
    }
}

/// Placeholder view shown until the controller pushes the first render.
fn startup_view() -> GateView {
    GateView {
        phase: SessionPhase::Disconnected,
        status: "Starting...".into(),
        address: None,
        detail: None,
        purchase_url: None,
        pairing_url: None,
        controls: Vec::new(),
        busy: true,
        terminal: false,
    }
}

// ---------------------------------------------------------------------------
// eframe::App
// ---------------------------------------------------------------------------

impl eframe::App for GateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1) Drain updates from the session controller.
        self.process_updates();

        // 2) Close the window after a verified session.
        if self.closing {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // 3) Schedule next repaint.
        ctx.request_repaint_after(Duration::from_millis(250));

        // 4) Toasts.
        render_toasts(&mut self.toasts, ctx);

        // 5) The gate.
        egui::CentralPanel::default().show(ctx, |ui| {
            gate::render(&self.view, &self.cmd_tx, ui);
        });
    }
}

// ---------------------------------------------------------------------------
// Toast rendering
// ---------------------------------------------------------------------------

fn render_toasts(toasts: &mut Vec<Toast>, ctx: &egui::Context) {
    toasts.retain(|t| t.created_at.elapsed() < TOAST_DURATION);

    if toasts.is_empty() {
        return;
    }

    egui::Area::new("toasts".into())
        .fixed_pos(egui::pos2(20.0, 20.0))
        .show(ctx, |ui| {
            for toast in toasts.iter() {
                let color = match toast.level {
                    ToastLevel::Info => theme::ACCENT,
                    ToastLevel::Success => theme::SUCCESS,
                    ToastLevel::Error => theme::DANGER,
                };
                let frame = egui::Frame::none()
                    .fill(color)
                    .inner_margin(egui::Margin::same(8.0))
                    .rounding(theme::BUTTON_ROUNDING);

                frame.show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(&toast.message)
                            .color(egui::Color32::WHITE)
                            .size(theme::FONT_SMALL),
                    );
                });
                ui.add_space(4.0);
            }
        });
}
