use eframe::egui;

pub fn advanced_options_panel(ui: &mut egui::Ui, show_advanced: &mut bool) -> bool {
    ui.horizontal(|ui| {
        let button_text = if *show_advanced { "▼ Advanced" } else { "▶ Advanced" };

        if ui.button(button_text).clicked() {
            *show_advanced = !*show_advanced;
        }

        if !*show_advanced {
            ui.label("Click to show overlay options");
        }
    });

    *show_advanced
}

/// True if `url` looks fetchable.
pub fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("http://") || url.starts_with("https://")) && !url.ends_with("://")
}
