use eframe::egui;
use loader_overlay::{Bar, OverlayState, OverlayView};

/// Draw the overlay as a dimmed, centred modal. Does nothing while hidden.
pub fn overlay_dialog(ctx: &egui::Context, state: &OverlayState) {
    if !state.visible {
        return;
    }
    let view = OverlayView::from(state);

    let dim = egui::LayerId::new(egui::Order::PanelResizeLine, egui::Id::new("overlay_dim"));
    ctx.layer_painter(dim)
        .rect_filled(ctx.screen_rect(), 0.0, egui::Color32::from_black_alpha(128));

    egui::Window::new(egui::RichText::new(&view.heading).strong())
        .id(egui::Id::new("overlay_dialog"))
        .order(egui::Order::Foreground)
        .collapsible(false)
        .resizable(false)
        .title_bar(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([400.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(5.0);
            ui.label(egui::RichText::new(&view.body).color(egui::Color32::GRAY));
            ui.add_space(15.0);
            progress_bar(ui, &view);
            ui.add_space(5.0);
        });
}

fn progress_bar(ui: &mut egui::Ui, view: &OverlayView) {
    let bar = match view.bar {
        Bar::Determinate(fraction) => egui::ProgressBar::new(fraction),
        Bar::Indeterminate => egui::ProgressBar::new(0.0).animate(true),
    };
    let bar = match &view.label {
        Some(label) => bar.text(label.as_str()),
        None => bar,
    };
    ui.add(bar);
}
