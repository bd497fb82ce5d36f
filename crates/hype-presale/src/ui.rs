//! UI helper components and platform glue

use eframe::egui;
use hype_presale_core::{BannerTone, Environment};

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(74, 222, 128);
pub const WARNING: egui::Color32 = egui::Color32::from_rgb(250, 204, 21);
pub const DANGER: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);

const MOBILE_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Touch-primary devices get a wallet deep link instead of an install prompt.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|marker| ua.contains(marker))
}

#[cfg(target_arch = "wasm32")]
pub fn detect_environment() -> Environment {
    let Some(window) = web_sys::window() else {
        return Environment::default();
    };
    let location = window.location();
    Environment {
        is_mobile: window
            .navigator()
            .user_agent()
            .map(|ua| is_mobile_user_agent(&ua))
            .unwrap_or(false),
        host: location.host().unwrap_or_default(),
        path: location.pathname().unwrap_or_default(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn detect_environment() -> Environment {
    Environment::default()
}

/// Leaves the page for the wallet app.
#[cfg(target_arch = "wasm32")]
pub fn navigate_to(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().set_href(url) {
            tracing::warn!(?e, "navigation failed");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn navigate_to(url: &str) {
    open_url_new_tab(url);
}

/// Open URL in a new browser tab
#[cfg(target_arch = "wasm32")]
pub fn open_url_new_tab(url: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.open_with_url_and_target(url, "_blank");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_url_new_tab(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!(error = %e, url, "failed to open browser");
    }
}

/// Copy to clipboard (platform-specific)
#[cfg(not(target_arch = "wasm32"))]
pub fn copy_to_clipboard(text: &str) {
    if let Ok(mut clipboard) = arboard::Clipboard::new() {
        let _ = clipboard.set_text(text);
    }
}

#[cfg(target_arch = "wasm32")]
pub fn copy_to_clipboard(text: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.navigator().clipboard().write_text(text);
    }
}

pub fn styled_title(ui: &mut egui::Ui, text: &str) {
    ui.heading(egui::RichText::new(text).size(34.0).strong().color(ACCENT));
}

pub fn banner(ui: &mut egui::Ui, text: &str, tone: BannerTone) {
    let fill = match tone {
        BannerTone::Ok => egui::Color32::from_rgb(20, 83, 45),
        BannerTone::Warning => egui::Color32::from_rgb(127, 29, 29),
    };
    egui::Frame::none()
        .fill(fill)
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| ui.label(egui::RichText::new(text).color(egui::Color32::WHITE)));
        });
}

/// Address block with a copy button; the address is shown exactly as given.
pub fn copyable_address(ui: &mut egui::Ui, label: &str, address: &str) {
    ui.label(egui::RichText::new(label).small());
    egui::Frame::none()
        .stroke(egui::Stroke::new(1.0, ACCENT))
        .rounding(4.0)
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(address).monospace());
                if ui
                    .small_button("📋")
                    .on_hover_text("Copy to clipboard")
                    .clicked()
                {
                    copy_to_clipboard(address);
                }
            });
        });
}

pub fn wide_button(ui: &mut egui::Ui, text: &str, fill: egui::Color32, enabled: bool) -> bool {
    let button = egui::Button::new(egui::RichText::new(text).strong().size(16.0))
        .fill(fill)
        .min_size(egui::vec2(ui.available_width(), 40.0));
    ui.add_enabled(enabled, button).clicked()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_user_agents_are_detected() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15"
        ));
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/120 Mobile"
        ));
        assert!(is_mobile_user_agent("Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)"));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120 Safari/537.36"
        ));
        assert!(!is_mobile_user_agent(""));
    }
}
