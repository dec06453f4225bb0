//! Upstream response seam: header lookup plus a chunked byte stream.

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::types::BoxError;

/// Body of a response as a stream of chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, BoxError>>;

/// A resolved response the tracker can read.
pub trait ResponseSource: Send {
    /// Case-insensitive header lookup.
    fn header(&self, name: &str) -> Option<String>;

    /// Take the body. `None` means the response has no readable body.
    fn into_body(self) -> Option<ByteStream>;
}

impl ResponseSource for reqwest::Response {
    fn header(&self, name: &str) -> Option<String> {
        self.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    }

    fn into_body(self) -> Option<ByteStream> {
        Some(self.bytes_stream().map_err(BoxError::from).boxed())
    }
}

/// One scripted step of a [`ChunkedResponse`] body.
enum Step {
    Chunk(Bytes),
    Fail(String),
}

/// In-memory response: fixed headers and a scripted sequence of chunks,
/// optionally ending in a read failure.
///
/// Useful to feed non-HTTP sources (files, pipes already read into memory)
/// through the tracker, and for tests.
#[derive(Default)]
pub struct ChunkedResponse {
    headers: Vec<(String, String)>,
    steps: Vec<Step>,
    has_body: bool,
}

impl ChunkedResponse {
    pub fn new() -> Self {
        Self {
            has_body: true,
            ..Default::default()
        }
    }

    /// A response whose body is missing entirely.
    pub fn without_body() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn content_length(self, len: u64) -> Self {
        self.with_header("Content-Length", len.to_string())
    }

    pub fn content_type(self, media_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", media_type)
    }

    pub fn chunk(mut self, bytes: impl Into<Bytes>) -> Self {
        self.steps.push(Step::Chunk(bytes.into()));
        self
    }

    /// Make the next read fail with `message`. Later steps are never reached.
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.steps.push(Step::Fail(message.into()));
        self
    }
}

impl ResponseSource for ChunkedResponse {
    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn into_body(self) -> Option<ByteStream> {
        if !self.has_body {
            return None;
        }
        let items = self.steps.into_iter().map(|step| match step {
            Step::Chunk(b) => Ok(b),
            Step::Fail(msg) => Err(BoxError::from(msg)),
        });
        Some(stream::iter(items).boxed())
    }
}
