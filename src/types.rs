//! Core types and options for loader_overlay.

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Default dwell time at 100% before the overlay hides itself.
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(800);

/// Percentage added by each auto-advance tick.
pub const AUTO_ADVANCE_STEP: u32 = 5;

/// Cadence of the auto-advance ticker: `max(1000 / (100 / step), 500)` ms.
pub const AUTO_ADVANCE_INTERVAL: Duration =
    Duration::from_millis(max_ms(1000 / (100 / AUTO_ADVANCE_STEP as u64), 500));

const fn max_ms(a: u64, b: u64) -> u64 {
    if a > b { a } else { b }
}

/// Boxed error used at the upstream seams (pending response, body stream).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Snapshot of everything a display needs to draw the overlay.
///
/// `progress` is only meaningful while `indeterminate` is false. It is not
/// clamped: a server that under-reports its length can push it past 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayState {
    pub visible: bool,
    pub title: String,
    pub description: String,
    pub progress: u32,
    pub auto_advance: bool,
    pub indeterminate: bool,
    pub show_label: bool,
    #[serde(with = "millis")]
    pub completion_delay: Duration,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            visible: false,
            title: String::new(),
            description: String::new(),
            progress: 0,
            auto_advance: false,
            indeterminate: false,
            show_label: true,
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

/// Options for [`Overlay::show`](crate::Overlay::show). Unset fields take the
/// defaults listed on each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowOptions {
    /// Default: "Processing".
    pub title: Option<String>,
    /// Default: "Please wait while we process your request."
    pub description: Option<String>,
    /// Default: 0.
    pub progress: Option<u32>,
    /// Default: true.
    pub auto_advance: Option<bool>,
    /// Default: false.
    pub indeterminate: Option<bool>,
    /// Default: true.
    pub show_label: Option<bool>,
    /// Default: 800ms.
    pub completion_delay: Option<Duration>,
}

impl ShowOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_indeterminate(mut self, on: bool) -> Self {
        self.indeterminate = Some(on);
        self
    }

    pub fn with_auto_advance(mut self, on: bool) -> Self {
        self.auto_advance = Some(on);
        self
    }

    pub fn with_show_label(mut self, on: bool) -> Self {
        self.show_label = Some(on);
        self
    }

    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = Some(delay);
        self
    }

    /// Resolve against the show defaults. The result is always visible.
    pub(crate) fn into_state(self) -> OverlayState {
        OverlayState {
            visible: true,
            title: self.title.unwrap_or_else(|| "Processing".to_string()),
            description: self
                .description
                .unwrap_or_else(|| "Please wait while we process your request.".to_string()),
            progress: self.progress.unwrap_or(0),
            auto_advance: self.auto_advance.unwrap_or(true),
            indeterminate: self.indeterminate.unwrap_or(false),
            show_label: self.show_label.unwrap_or(true),
            completion_delay: self.completion_delay.unwrap_or(DEFAULT_COMPLETION_DELAY),
        }
    }
}

/// Partial update for [`Overlay::update`](crate::Overlay::update). Only the
/// `Some` fields are compared and merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub progress: Option<u32>,
    pub auto_advance: Option<bool>,
    pub indeterminate: Option<bool>,
    pub show_label: Option<bool>,
    pub completion_delay: Option<Duration>,
}

impl UpdateOptions {
    pub fn progress(value: u32) -> Self {
        Self {
            progress: Some(value),
            ..Default::default()
        }
    }

    /// Switch to a tracked, determinate bar starting at 0%.
    pub fn determinate() -> Self {
        Self {
            indeterminate: Some(false),
            auto_advance: Some(false),
            progress: Some(0),
            show_label: Some(true),
            ..Default::default()
        }
    }

    /// True if applying this update would leave `state` unchanged.
    pub(crate) fn is_noop_for(&self, state: &OverlayState) -> bool {
        fn same<T: PartialEq>(new: &Option<T>, cur: &T) -> bool {
            new.as_ref().is_none_or(|v| v == cur)
        }
        same(&self.title, &state.title)
            && same(&self.description, &state.description)
            && same(&self.progress, &state.progress)
            && same(&self.auto_advance, &state.auto_advance)
            && same(&self.indeterminate, &state.indeterminate)
            && same(&self.show_label, &state.show_label)
            && same(&self.completion_delay, &state.completion_delay)
    }

    pub(crate) fn apply_to(self, state: &mut OverlayState) {
        if let Some(v) = self.title {
            state.title = v;
        }
        if let Some(v) = self.description {
            state.description = v;
        }
        if let Some(v) = self.progress {
            state.progress = v;
        }
        if let Some(v) = self.auto_advance {
            state.auto_advance = v;
        }
        if let Some(v) = self.indeterminate {
            state.indeterminate = v;
        }
        if let Some(v) = self.show_label {
            state.show_label = v;
        }
        if let Some(v) = self.completion_delay {
            state.completion_delay = v;
        }
    }
}

/// Options for [`Overlay::track`](crate::Overlay::track).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOptions {
    pub title: String,
    pub description: String,
    /// Start with an animated bar and no percentage until a size is known.
    pub indeterminate: bool,
    pub show_label: bool,
    /// Minimum time the finished bar stays visible before hiding.
    pub completion_delay: Duration,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            title: "Processing Request".to_string(),
            description: "Please wait while we complete your request...".to_string(),
            indeterminate: true,
            show_label: false,
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }
}

impl TrackOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }
}

/// Decoded body returned by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body declared as `application/json`.
    Json(serde_json::Value),
    /// Any other declared media type; bytes are passed through untouched.
    Blob { media_type: String, bytes: Bytes },
    /// No media type declared; bytes decoded as UTF-8.
    Text(String),
}

impl Payload {
    /// Size of the payload in bytes (serialized size for JSON).
    pub fn len(&self) -> usize {
        match self {
            Payload::Json(v) => v.to_string().len(),
            Payload::Blob { bytes, .. } => bytes.len(),
            Payload::Text(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Library error type (no panics for expected failures).
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("response unavailable: {0}")]
    Unavailable(#[source] BoxError),
    #[error("Response has no body")]
    NoBody,
    #[error("stream read failed: {0}")]
    Read(#[source] BoxError),
    #[error("invalid JSON body")]
    Decode(#[from] serde_json::Error),
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}

/// Outcome of [`Overlay::track`](crate::Overlay::track): exactly one of
/// `data` and `error` is present.
#[derive(Debug)]
pub struct StreamedResult {
    data: Option<Payload>,
    error: Option<LoaderError>,
}

impl StreamedResult {
    pub fn ok(data: Payload) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: LoaderError) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&LoaderError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.data.is_some()
    }

    pub fn into_result(self) -> Result<Payload, LoaderError> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(e)) => Err(e),
            (None, None) => Err(LoaderError::NoBody),
        }
    }
}

impl From<Result<Payload, LoaderError>> for StreamedResult {
    fn from(r: Result<Payload, LoaderError>) -> Self {
        match r {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e),
        }
    }
}
