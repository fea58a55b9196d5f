//! Photo compression for durable storage.
//!
//! Uploaded photos are shrunk before they are stored so a handful of entries
//! fit in the storage quota:
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` |
//! | **Fit** | [`fit_within`]: uniform scale, never upscales |
//! | **Draw** | `DynamicImage::resize_exact` with `Lanczos3` |
//! | **Encode** | `image::codecs::jpeg::JpegEncoder` at the quality factor |
//! | **Embed** | `base64` into a `data:image/jpeg;base64,` URL |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a draw
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`compress`] and its background variant

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceHandle};
pub use calculations::fit_within;
pub use operations::{
    CompressError, CompressEvent, CompressOptions, DATA_URL_PREFIX, compress,
    compress_in_background, decode_data_url,
};
pub use params::{DrawParams, Quality};
pub use rust_backend::RustBackend;
