#![forbid(unsafe_code)]
//! `loader-fetch`: download a URL while showing the loading overlay on stderr.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use loader_overlay::{LoaderError, Overlay, OverlayState, Payload, TerminalRenderer, TrackOptions};
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(
    name = "loader-fetch",
    version,
    about = "Fetch a URL with a progress overlay"
)]
struct Cli {
    /// URL to GET (http or https)
    url: String,

    /// Write the payload here instead of stdout
    #[arg(short = 'o', long = "out")]
    output: Option<PathBuf>,

    /// Overlay heading
    #[arg(long, default_value = "Processing Request")]
    title: String,

    /// Overlay body text
    #[arg(long, default_value = "Please wait while we complete your request...")]
    description: String,

    /// Minimum time the finished bar stays visible (milliseconds)
    #[arg(long, default_value_t = 800)]
    completion_delay_ms: u64,

    /// Start with a percentage bar instead of an animated one
    #[arg(long)]
    determinate: bool,

    /// Show the label next to the bar while waiting for headers
    #[arg(long)]
    show_label: bool,

    /// Write binary payloads to stdout as raw bytes instead of a summary
    #[arg(long)]
    raw: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).
    let cli = Cli::parse();

    if !(cli.url.starts_with("http://") || cli.url.starts_with("https://")) {
        return Err(LoaderError::Invalid("url must start with http:// or https://").into());
    }

    let options = TrackOptions {
        title: cli.title.clone(),
        description: cli.description.clone(),
        indeterminate: !cli.determinate,
        show_label: cli.show_label,
        completion_delay: Duration::from_millis(cli.completion_delay_ms),
    };

    let overlay = Overlay::new();
    let renderer = tokio::spawn(render(overlay.watch()));

    let client = reqwest::Client::new();
    let pending = async { client.get(&cli.url).send().await?.error_for_status() };
    let result = overlay.track(pending, options).await;

    drop(overlay);
    let _ = renderer.await;

    let payload = result
        .into_result()
        .with_context(|| format!("fetching {} failed", cli.url))?;
    emit(&payload, cli.output.as_deref(), cli.raw)
}

/// Redraw the overlay until every handle to it is gone.
async fn render(mut rx: watch::Receiver<Arc<OverlayState>>) {
    let mut term = TerminalRenderer::new(std::io::stderr());
    loop {
        let snapshot = rx.borrow_and_update().clone();
        term.draw(&snapshot);
        if rx.changed().await.is_err() {
            term.draw(&rx.borrow().clone());
            return;
        }
    }
}

fn emit(payload: &Payload, output: Option<&Path>, raw: bool) -> Result<()> {
    let bytes: Vec<u8> = match payload {
        Payload::Json(value) => {
            let mut s = serde_json::to_string_pretty(value)?;
            s.push('\n');
            s.into_bytes()
        }
        Payload::Text(text) => text.clone().into_bytes(),
        Payload::Blob { media_type, bytes } => {
            if output.is_none() && !raw {
                println!("{media_type}: {} bytes (use --out or --raw to save)", bytes.len());
                return Ok(());
            }
            bytes.to_vec()
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}
