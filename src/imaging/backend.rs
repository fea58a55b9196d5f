//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the raster surface the compressor draws on.
//! A decoded upload lives inside the backend behind a [`SourceHandle`] until
//! it is released, the same way a browser keeps an object URL alive until it
//! is revoked. Callers go through
//! [`compress`](super::operations::compress), which guarantees the release.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::DrawParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("no raster drawing surface: {0}")]
    Unsupported(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("unknown source handle {0}")]
    UnknownHandle(u64),
}

/// Pixel size of a decoded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Backend-issued reference to a decoded source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(pub u64);

/// Trait for raster backends.
///
/// `Sync + Send` so one backend can serve compressions running on the rayon
/// pool.
pub trait ImageBackend: Sync + Send {
    /// Decode `bytes` and keep the raster until [`release`](Self::release).
    fn open(&self, bytes: &[u8]) -> Result<SourceHandle, BackendError>;

    /// Size of an opened source.
    fn identify(&self, source: SourceHandle) -> Result<Dimensions, BackendError>;

    /// Draw the source at the requested size and return the encoded JPEG.
    fn draw(&self, params: &DrawParams) -> Result<Vec<u8>, BackendError>;

    /// Drop the decoded raster. Releasing an unknown handle is a no-op.
    fn release(&self, source: SourceHandle);
}
