use tokio::sync::mpsc;
use loader_overlay::{Overlay, Payload, TrackOptions};

#[derive(Debug)]
pub enum OperationMessage {
    Success(String),
    Error(String),
}

/// Helper function to send operation messages with proper error handling
///
/// If the send fails, it logs the error. This can happen if the receiver has been dropped,
/// which typically occurs when the GUI has been closed.
fn send_message(sender: &mpsc::UnboundedSender<OperationMessage>, msg: OperationMessage) {
    if let Err(e) = sender.send(msg) {
        log::warn!("Failed to send operation message: {:?}. Receiver may have been dropped.", e);
    }
}

/// Short human summary of a fetched payload.
pub fn describe(payload: &Payload) -> String {
    match payload {
        Payload::Json(value) => serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| value.to_string()),
        Payload::Text(text) => text.clone(),
        Payload::Blob { media_type, bytes } => {
            format!("Binary payload\nType: {}\nSize: {} bytes", media_type, bytes.len())
        }
    }
}

pub struct Operation;

impl Operation {
    pub async fn fetch(
        overlay: Overlay,
        url: String,
        options: TrackOptions,
        sender: mpsc::UnboundedSender<OperationMessage>,
    ) {
        let client = reqwest::Client::new();
        let pending = async { client.get(&url).send().await?.error_for_status() };

        match overlay.track(pending, options).await.into_result() {
            Ok(payload) => {
                send_message(&sender, OperationMessage::Success(describe(&payload)));
            }
            Err(e) => {
                send_message(&sender, OperationMessage::Error(
                    format!("Fetching {} failed: {}", url, e)
                ));
            }
        }
    }
}
