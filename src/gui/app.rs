use eframe::egui;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::gui::dialog::overlay_dialog;
use crate::gui::operations::{Operation, OperationMessage};
use crate::gui::widgets::{advanced_options_panel, is_http_url};

use loader_overlay::{Overlay, TrackOptions};

pub struct LoaderApp {
    // Request
    url: String,

    // Overlay options
    show_advanced: bool,
    options: TrackOptions,
    completion_delay_ms: u64,

    // Overlay shared with the running operation
    overlay: Overlay,

    // Results
    operation_result: Option<String>,
    error_message: Option<String>,

    // Runtime state
    operation_handle: Option<tokio::task::JoinHandle<()>>,
    result_receiver: Option<mpsc::UnboundedReceiver<OperationMessage>>,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl LoaderApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, runtime: Arc<tokio::runtime::Runtime>) -> Self {
        let options = TrackOptions::default();
        Self {
            url: String::new(),
            show_advanced: false,
            completion_delay_ms: options.completion_delay.as_millis() as u64,
            options,
            overlay: Overlay::new(),
            operation_result: None,
            error_message: None,
            operation_handle: None,
            result_receiver: None,
            runtime,
        }
    }

    fn is_running(&self) -> bool {
        self.operation_handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl eframe::App for LoaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle incoming messages from operations
        self.handle_operation_messages();

        let state = self.overlay.state();

        // Request repaint while the overlay or an operation is live
        if state.visible || self.is_running() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_ui(ui);
        });

        overlay_dialog(ctx, &state);
    }
}

impl LoaderApp {
    fn draw_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("⬇ Loader Overlay Demo");

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.label("URL:");
            ui.add(egui::TextEdit::singleline(&mut self.url)
                .hint_text("https://example.com/file.bin")
                .desired_width(400.0));
        });

        ui.add_space(10.0);

        if advanced_options_panel(ui, &mut self.show_advanced) {
            self.draw_advanced_options(ui);
        }

        ui.add_space(15.0);

        let can_fetch = is_http_url(&self.url) && !self.is_running();

        ui.horizontal(|ui| {
            if ui.add_enabled(can_fetch, egui::Button::new("⬇ Fetch").min_size(egui::vec2(120.0, 30.0))).clicked() {
                self.start_fetch_operation();
            }

            if !can_fetch && !self.is_running() {
                ui.label(egui::RichText::new("Enter an http(s) URL").color(egui::Color32::GRAY));
            }
        });

        ui.add_space(20.0);

        self.draw_results_ui(ui);
    }

    fn draw_advanced_options(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("Overlay Options").strong());

            ui.horizontal(|ui| {
                ui.label("Title:");
                ui.add(egui::TextEdit::singleline(&mut self.options.title).desired_width(250.0));
            });

            ui.horizontal(|ui| {
                ui.label("Description:");
                ui.add(egui::TextEdit::singleline(&mut self.options.description).desired_width(250.0));
            });

            ui.checkbox(&mut self.options.indeterminate, "Animated bar until the size is known");
            ui.checkbox(&mut self.options.show_label, "Show label while waiting");

            ui.horizontal(|ui| {
                ui.label("Completion delay (ms):");
                ui.add(egui::DragValue::new(&mut self.completion_delay_ms)
                    .range(0..=10_000)
                    .speed(50));
            });
        });
    }

    fn draw_results_ui(&mut self, ui: &mut egui::Ui) {
        if let Some(result) = self.operation_result.clone() {
            ui.separator();
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                ui.label("✅ ");
                ui.label("Fetch completed successfully!");
            });

            ui.group(|ui| {
                ui.set_width(ui.available_width());
                egui::ScrollArea::vertical()
                    .max_height(200.0)
                    .show(ui, |ui| {
                        ui.add(egui::TextEdit::multiline(&mut result.as_str())
                            .desired_width(f32::INFINITY)
                            .code_editor());
                    });
            });

            if ui.button("🗑 Clear").clicked() {
                self.operation_result = None;
            }
        }

        if let Some(error) = self.error_message.clone() {
            ui.separator();
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                ui.label("❌ ");
                ui.colored_label(egui::Color32::RED, "Error occurred:");
            });

            ui.group(|ui| {
                ui.set_width(ui.available_width());
                ui.colored_label(egui::Color32::RED, error);
            });

            if ui.button("🗑 Clear").clicked() {
                self.error_message = None;
            }
        }
    }

    fn handle_operation_messages(&mut self) {
        let mut messages_to_process = Vec::new();

        if let Some(ref mut receiver) = self.result_receiver {
            while let Ok(message) = receiver.try_recv() {
                messages_to_process.push(message);
            }
        }

        for message in messages_to_process {
            match message {
                OperationMessage::Success(result) => {
                    self.operation_result = Some(result);
                    self.error_message = None;
                    self.result_receiver = None;
                }
                OperationMessage::Error(error) => {
                    self.error_message = Some(error);
                    self.operation_result = None;
                    self.result_receiver = None;
                }
            }
        }
    }

    fn start_fetch_operation(&mut self) {
        let url = self.url.trim().to_string();
        let mut options = self.options.clone();
        options.completion_delay = Duration::from_millis(self.completion_delay_ms);
        let overlay = self.overlay.clone();

        let (sender, receiver) = mpsc::unbounded_channel();
        self.result_receiver = Some(receiver);
        self.operation_result = None;
        self.error_message = None;

        self.operation_handle = Some(self.runtime.spawn(async move {
            Operation::fetch(overlay, url, options, sender).await;
        }));
    }
}
