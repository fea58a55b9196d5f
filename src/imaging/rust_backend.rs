//! Pure Rust image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//!
//! JPEG has no alpha channel, so sources are flattened to RGB before
//! encoding.

use super::backend::{BackendError, Dimensions, ImageBackend, SourceHandle};
use super::params::DrawParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

/// Pure Rust backend using the `image` crate.
///
/// Decoded sources are held in memory, keyed by handle, until released.
pub struct RustBackend {
    sources: Mutex<HashMap<u64, DynamicImage>>,
    next_id: AtomicU64,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            sources: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of decoded sources not yet released.
    pub fn open_sources(&self) -> usize {
        self.sources().len()
    }

    fn sources(&self) -> MutexGuard<'_, HashMap<u64, DynamicImage>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.sources.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn open(&self, bytes: &[u8]) -> Result<SourceHandle, BackendError> {
        let img = image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(id, width = img.width(), height = img.height(), "opened source");
        self.sources().insert(id, img);
        Ok(SourceHandle(id))
    }

    fn identify(&self, source: SourceHandle) -> Result<Dimensions, BackendError> {
        let sources = self.sources();
        let img = sources
            .get(&source.0)
            .ok_or(BackendError::UnknownHandle(source.0))?;
        Ok(Dimensions {
            width: img.width(),
            height: img.height(),
        })
    }

    fn draw(&self, params: &DrawParams) -> Result<Vec<u8>, BackendError> {
        let resized = {
            let sources = self.sources();
            let img = sources
                .get(&params.source.0)
                .ok_or(BackendError::UnknownHandle(params.source.0))?;
            if img.width() == params.width && img.height() == params.height {
                img.clone()
            } else {
                img.resize_exact(params.width, params.height, FilterType::Lanczos3)
            }
        };
        encode_jpeg(&resized, params.quality.jpeg_value())
    }

    fn release(&self, source: SourceHandle) {
        if self.sources().remove(&source.0).is_some() {
            trace!(id = source.0, "released source");
        }
    }
}
