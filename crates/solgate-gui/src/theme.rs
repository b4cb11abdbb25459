//! Visual theme for the Solgate gate window.
//!
//! Follows the Telegram in-app look: light surfaces, the Telegram
//! accent blue, restrained spacing.

use eframe::egui;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Background for the main window.
pub const BG_PRIMARY: egui::Color32 = egui::Color32::from_rgb(255, 255, 255);

/// Background for secondary surfaces.
pub const BG_SECONDARY: egui::Color32 = egui::Color32::from_rgb(241, 241, 244);

/// Primary accent (buttons, links) — Telegram blue.
pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(42, 171, 238);

/// Success indicator.
pub const SUCCESS: egui::Color32 = egui::Color32::from_rgb(76, 158, 91);

/// Error / danger indicator.
pub const DANGER: egui::Color32 = egui::Color32::from_rgb(197, 66, 66);

/// Muted text.
pub const TEXT_MUTED: egui::Color32 = egui::Color32::from_rgb(142, 142, 147);

/// Normal text.
pub const TEXT_NORMAL: egui::Color32 = egui::Color32::from_rgb(34, 34, 38);

/// Header text.
pub const TEXT_HEADER: egui::Color32 = egui::Color32::from_rgb(20, 20, 24);

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

pub const PANEL_PADDING: f32 = 12.0;
pub const ITEM_SPACING: f32 = 6.0;
pub const SECTION_SPACING: f32 = 16.0;
pub const BUTTON_ROUNDING: f32 = 6.0;

// ---------------------------------------------------------------------------
// Font sizes
// ---------------------------------------------------------------------------

pub const FONT_HEADER: f32 = 18.0;
pub const FONT_BODY: f32 = 14.0;
pub const FONT_SMALL: f32 = 12.0;

// ---------------------------------------------------------------------------
// Theme application
// ---------------------------------------------------------------------------

/// Applies the Solgate theme to an egui context.
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals.widgets.noninteractive.rounding =
        egui::Rounding::same(BUTTON_ROUNDING);
    style.visuals.widgets.inactive.rounding =
        egui::Rounding::same(BUTTON_ROUNDING);
    style.visuals.widgets.hovered.rounding =
        egui::Rounding::same(BUTTON_ROUNDING);
    style.visuals.widgets.active.rounding =
        egui::Rounding::same(BUTTON_ROUNDING);

    style.visuals.window_fill = BG_PRIMARY;
    style.visuals.panel_fill = BG_PRIMARY;
    style.visuals.faint_bg_color = BG_SECONDARY;

    style.spacing.item_spacing = egui::vec2(ITEM_SPACING, ITEM_SPACING);
    style.spacing.window_margin = egui::Margin::same(PANEL_PADDING);

    style.visuals.override_text_color = Some(TEXT_NORMAL);

    ctx.set_style(style);
}

/// Header label.
pub fn header(text: &str) -> egui::RichText {
    egui::RichText::new(text)
        .size(FONT_HEADER)
        .color(TEXT_HEADER)
        .strong()
}

/// Muted small text.
pub fn muted(text: &str) -> egui::RichText {
    egui::RichText::new(text)
        .size(FONT_SMALL)
        .color(TEXT_MUTED)
}

/// Body text.
pub fn body(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(FONT_BODY)
}

/// Accent-colored button.
pub fn accent_button(ui: &mut egui::Ui, label: &str) -> egui::Response {
    let button = egui::Button::new(
        egui::RichText::new(label).color(egui::Color32::WHITE),
    )
    .fill(ACCENT)
    .rounding(BUTTON_ROUNDING);
    ui.add(button)
}

/// Danger-colored button.
pub fn danger_button(ui: &mut egui::Ui, label: &str) -> egui::Response {
    let button = egui::Button::new(
        egui::RichText::new(label).color(egui::Color32::WHITE),
    )
    .fill(DANGER)
    .rounding(BUTTON_ROUNDING);
    ui.add(button)
}

/// Shortens a base58 address for display: `4vJ9…LKi` style.
pub fn short_address(s: &str) -> String {
    if s.len() > 12 {
        format!("{}…{}", &s[..4], &s[s.len() - 4..])
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_truncates_long_input() {
        let s = "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi";
        let short = short_address(s);
        assert!(short.starts_with("4vJ9"));
        assert!(short.ends_with("bkLKi") || short.ends_with("kLKi"));
        assert!(short.len() < s.len());
    }

    #[test]
    fn short_address_keeps_short_input() {
        assert_eq!(short_address("abcd"), "abcd");
    }
}
