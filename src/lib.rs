#![forbid(unsafe_code)]
//! # loader_overlay — progress overlay driven by streamed responses.
//!
//! `loader_overlay` keeps the state of a modal loading overlay (title,
//! description, percentage, determinate or indeterminate bar) and offers a
//! tracker that feeds that state from a response body as it downloads.
//!
//! ## Features
//! - **Owned overlay state** with `show` / `update` / `hide` and change notification
//! - **Cosmetic auto-advance** as a cancellable task, for work without real progress
//! - **Streamed response tracking** with byte-accurate percentages from `Content-Length`
//! - **Payload decoding** to JSON, typed binary blob, or UTF-8 text by `Content-Type`
//! - **Renderers**: a one-line terminal view and an egui modal dialog
//!
//! ## Example: track a download
//! ```no_run
//! use loader_overlay::{Overlay, Payload, TrackOptions};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let overlay = Overlay::new();
//! let pending = reqwest::get("https://example.com/archive.zip");
//!
//! let result = overlay
//!     .track(pending, TrackOptions::default().with_title("Downloading"))
//!     .await;
//! match result.into_result()? {
//!     Payload::Blob { media_type, bytes } => println!("{media_type}: {} bytes", bytes.len()),
//!     other => println!("{other:?}"),
//! }
//! assert!(!overlay.state().visible);
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: drive the overlay by hand
//! ```no_run
//! use loader_overlay::{Overlay, ShowOptions, UpdateOptions};
//!
//! # async fn run() {
//! let overlay = Overlay::new();
//! overlay.show(ShowOptions::default().with_title("Saving").with_auto_advance(false));
//! overlay.update(UpdateOptions::progress(50));
//! overlay.hide();
//! # }
//! ```

mod types;
mod source;
mod overlay;
mod tracker;
mod display;

// Re-export public API from modules
pub use types::*;
pub use source::{ByteStream, ChunkedResponse, ResponseSource};
pub use overlay::Overlay;
pub use tracker::percent_of;
pub use display::{Bar, OverlayView, TerminalRenderer, render_line};
