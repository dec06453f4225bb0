//! Streamed response tracker: drives an [`Overlay`] from downloaded bytes.

use std::future::IntoFuture;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use log::{debug, warn};

use crate::overlay::Overlay;
use crate::source::ResponseSource;
use crate::types::{
    BoxError, LoaderError, Payload, ShowOptions, StreamedResult, TrackOptions, UpdateOptions,
};

/// Media type fragment that routes a body to the JSON path.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Percentage of `total` covered by `read`, rounded half up. Not clamped.
pub fn percent_of(read: u64, total: u64) -> u32 {
    ((read as f64 / total as f64) * 100.0).round() as u32
}

/// Declared body size, if the header is present, numeric and non-zero.
fn declared_total<R: ResponseSource>(resp: &R) -> Option<u64> {
    resp.header("Content-Length")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
}

impl Overlay {
    /// Show the overlay while `pending` resolves and its body downloads.
    ///
    /// The overlay starts indeterminate, switches to a percentage bar once a
    /// `Content-Length` is known, and is always hidden again before this
    /// returns, whatever the outcome. Failures come back inside the
    /// [`StreamedResult`]; nothing is thrown.
    ///
    /// Bodies declared as `application/json` are read whole and parsed,
    /// without progress updates. Any other declared media type yields a
    /// [`Payload::Blob`]; no media type yields [`Payload::Text`].
    pub async fn track<F, R, E>(&self, pending: F, options: TrackOptions) -> StreamedResult
    where
        F: IntoFuture<Output = Result<R, E>>,
        R: ResponseSource,
        E: Into<BoxError>,
    {
        self.show(ShowOptions {
            title: Some(options.title.clone()),
            description: Some(options.description.clone()),
            indeterminate: Some(options.indeterminate),
            show_label: Some(options.show_label),
            completion_delay: Some(options.completion_delay),
            ..Default::default()
        });

        let result = self.drive(pending, &options).await;
        self.hide();
        if let Err(e) = &result {
            warn!("tracked request failed: {e}");
        }
        result.into()
    }

    async fn drive<F, R, E>(&self, pending: F, options: &TrackOptions) -> Result<Payload, LoaderError>
    where
        F: IntoFuture<Output = Result<R, E>>,
        R: ResponseSource,
        E: Into<BoxError>,
    {
        let response = pending
            .await
            .map_err(|e| LoaderError::Unavailable(e.into()))?;

        let total = declared_total(&response);
        let media_type = response.header("Content-Type");
        let mut body = response.into_body().ok_or(LoaderError::NoBody)?;
        debug!("response resolved: total={total:?} type={media_type:?}");

        if media_type
            .as_deref()
            .is_some_and(|t| t.contains(JSON_MEDIA_TYPE))
        {
            let mut raw = BytesMut::new();
            while let Some(chunk) = body.next().await {
                raw.extend_from_slice(&chunk.map_err(LoaderError::Read)?);
            }
            return Ok(Payload::Json(serde_json::from_slice(&raw)?));
        }

        if total.is_some() {
            self.update(UpdateOptions::determinate());
        }

        let mut chunks: Vec<Bytes> = Vec::new();
        let mut read: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(LoaderError::Read)?;
            read += chunk.len() as u64;
            chunks.push(chunk);
            if let Some(total) = total {
                self.update(UpdateOptions::progress(percent_of(read, total)));
            }
        }

        if total.is_some() {
            self.update(UpdateOptions::progress(100));
        }
        debug!("body complete: {read} bytes in {} chunks", chunks.len());

        tokio::time::sleep(options.completion_delay).await;
        if total.is_some() {
            self.complete();
        } else {
            self.hide();
        }

        let bytes = concat(chunks, read);
        Ok(match media_type {
            Some(media_type) => Payload::Blob { media_type, bytes },
            None => Payload::Text(String::from_utf8_lossy(&bytes).into_owned()),
        })
    }
}

fn concat(chunks: Vec<Bytes>, len: u64) -> Bytes {
    if chunks.len() == 1 {
        return chunks.into_iter().next().unwrap_or_default();
    }
    let mut out = BytesMut::with_capacity(len as usize);
    for chunk in &chunks {
        out.extend_from_slice(chunk);
    }
    out.freeze()
}
