//! Display-side view of an overlay snapshot, shared by the terminal and egui
//! renderers.

use std::io::Write;

use crate::types::OverlayState;

const FALLBACK_HEADING: &str = "Processing Your Request";
const FALLBACK_BODY: &str = "Please wait while we process your data. This may take a few moments.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bar {
    /// Fraction filled, clamped to `0.0..=1.0` for drawing.
    Determinate(f32),
    Indeterminate,
}

/// What a renderer should draw for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub heading: String,
    pub body: String,
    pub bar: Bar,
    pub label: Option<String>,
}

impl From<&OverlayState> for OverlayView {
    fn from(s: &OverlayState) -> Self {
        let pick = |text: &str, fallback: &str| {
            if text.is_empty() { fallback.to_string() } else { text.to_string() }
        };
        let bar = if s.indeterminate {
            Bar::Indeterminate
        } else {
            Bar::Determinate((s.progress as f32 / 100.0).clamp(0.0, 1.0))
        };
        let label = s.show_label.then(|| {
            if s.indeterminate {
                "Loading...".to_string()
            } else {
                format!("{}%", s.progress)
            }
        });
        Self {
            heading: pick(&s.title, FALLBACK_HEADING),
            body: pick(&s.description, FALLBACK_BODY),
            bar,
            label,
        }
    }
}

/// Width of the bar drawn by [`render_line`], in cells.
const LINE_BAR_WIDTH: usize = 30;

/// Single-line text rendition used by the terminal renderer.
pub fn render_line(view: &OverlayView) -> String {
    let bar = match view.bar {
        Bar::Determinate(f) => {
            let filled = (f * LINE_BAR_WIDTH as f32).round() as usize;
            format!("[{}{}]", "#".repeat(filled), "-".repeat(LINE_BAR_WIDTH - filled))
        }
        Bar::Indeterminate => format!("[{}]", "~".repeat(LINE_BAR_WIDTH)),
    };
    match &view.label {
        Some(label) => format!("{}: {} {}", view.heading, bar, label),
        None => format!("{}: {}", view.heading, bar),
    }
}

/// Redraws the overlay on one terminal line whenever the snapshot changes.
///
/// Write errors are ignored; the terminal is best effort.
pub struct TerminalRenderer<W: Write> {
    out: W,
    showing: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, showing: false }
    }

    pub fn draw(&mut self, state: &OverlayState) {
        if state.visible {
            let line = render_line(&OverlayView::from(state));
            let _ = write!(self.out, "\r\x1b[2K{line}");
            self.showing = true;
        } else if self.showing {
            let _ = write!(self.out, "\r\x1b[2K");
            self.showing = false;
        }
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
