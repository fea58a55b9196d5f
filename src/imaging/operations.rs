//! High-level compression operations.
//!
//! [`compress`] combines the fit calculation with backend execution and
//! returns a self-contained `data:` URL. [`compress_in_background`] runs the
//! same work on the rayon pool and reports the outcome as a single
//! [`CompressEvent`] on a channel, so an interactive caller can keep handling
//! input while a large photo is decoded.

use super::backend::{BackendError, ImageBackend, SourceHandle};
use super::calculations::fit_within;
use super::params::{DrawParams, Quality};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("no raster drawing surface available: {0}")]
    UnsupportedEnvironment(String),
    #[error("could not encode image: {0}")]
    Encode(String),
}

impl From<BackendError> for CompressError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Decode(msg) => CompressError::Decode(msg),
            BackendError::Unsupported(msg) => CompressError::UnsupportedEnvironment(msg),
            BackendError::Encode(msg) => CompressError::Encode(msg),
            BackendError::UnknownHandle(id) => {
                CompressError::Decode(format!("source {id} is no longer open"))
            }
        }
    }
}

/// Settings for photo compression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressOptions {
    /// Longest allowed edge in pixels.
    pub max_dimension: u32,
    pub quality: Quality,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1280,
            quality: Quality::default(),
        }
    }
}

/// Resolution of a background compression.
#[derive(Debug)]
pub struct CompressEvent {
    /// Caller-chosen tag to match the event to its request.
    pub tag: String,
    pub result: Result<String, CompressError>,
}

/// Releases the source when dropped, on success and on every error path.
struct SourceGuard<'a, B: ImageBackend + ?Sized> {
    backend: &'a B,
    handle: SourceHandle,
}

impl<B: ImageBackend + ?Sized> Drop for SourceGuard<'_, B> {
    fn drop(&mut self) {
        self.backend.release(self.handle);
    }
}

/// Shrink an image to fit `options.max_dimension` and return it as a JPEG
/// `data:` URL.
pub fn compress<B: ImageBackend + ?Sized>(
    backend: &B,
    bytes: &[u8],
    options: &CompressOptions,
) -> Result<String, CompressError> {
    let guard = SourceGuard {
        backend,
        handle: backend.open(bytes)?,
    };

    let dims = backend.identify(guard.handle)?;
    let (width, height) = fit_within((dims.width, dims.height), options.max_dimension);

    let jpeg = backend.draw(&DrawParams {
        source: guard.handle,
        width,
        height,
        quality: options.quality,
    })?;

    debug!(
        from = %format!("{}x{}", dims.width, dims.height),
        to = %format!("{width}x{height}"),
        input_bytes = bytes.len(),
        output_bytes = jpeg.len(),
        "compressed photo"
    );
    Ok(to_data_url(&jpeg))
}

/// Run [`compress`] on the rayon pool. Exactly one event is sent on `tx`.
pub fn compress_in_background<B: ImageBackend + 'static>(
    backend: Arc<B>,
    tag: String,
    bytes: Vec<u8>,
    options: CompressOptions,
    tx: Sender<CompressEvent>,
) {
    rayon::spawn(move || {
        let result = compress(backend.as_ref(), &bytes, &options);
        if tx.send(CompressEvent { tag, result }).is_err() {
            warn!("compression finished after its receiver went away");
        }
    });
}

fn to_data_url(jpeg: &[u8]) -> String {
    format!("{DATA_URL_PREFIX}{}", STANDARD.encode(jpeg))
}

/// Decode the JPEG bytes of a `data:` URL produced by [`compress`].
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let payload = url.strip_prefix(DATA_URL_PREFIX)?;
    STANDARD.decode(payload).ok()
}
