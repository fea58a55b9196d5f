//! Shared test utilities for the rakhi-gal test suite.
//!
//! Provides entry builders, an in-memory catalog, and synthetic image bytes
//! for the imaging tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut catalog = memory_catalog(MemoryStorage::default(), seed_fixture());
//! catalog.initialize();
//! assert_eq!(catalog.len(), 2);
//!
//! let bytes = synthetic_jpeg(200, 150);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::catalog::Catalog;
use crate::notify::RecordingNotifier;
use crate::storage::MemoryStorage;
use crate::store::{CollectionStore, DEFAULT_KEY};
use crate::types::{Category, Entry};

/// Fixed creation time used by every fixture entry.
pub const FIXTURE_CREATED_AT: i64 = 1_700_000_000_000;

// =========================================================================
// Entry fixtures
// =========================================================================

/// A photo-less entry with a fixed timestamp.
pub fn entry(id: &str, name: &str, category: Category) -> Entry {
    Entry {
        id: id.to_string(),
        name: name.to_string(),
        category,
        photo: None,
        created_at: FIXTURE_CREATED_AT,
    }
}

/// A two-entry seed: one real sister, one chosen sister.
pub fn seed_fixture() -> Vec<Entry> {
    vec![
        entry("sneha-dido", "Sneha (Dido)", Category::Real),
        entry("manasvi", "Manasvi", Category::Vow),
    ]
}

/// Catalog over the given storage, using the default key and a recording notifier.
pub fn memory_catalog(
    storage: MemoryStorage,
    seed: Vec<Entry>,
) -> Catalog<MemoryStorage, RecordingNotifier> {
    let store = CollectionStore::new(storage, RecordingNotifier::new(), DEFAULT_KEY);
    Catalog::new(store, seed)
}

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient_rgb(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 255 / width.max(1)) as u8);
            pixels.push((y * 255 / height.max(1)) as u8);
            pixels.push(128);
        }
    }
    pixels
}

/// Encode a gradient of the given size as JPEG.
pub fn synthetic_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(
            &gradient_rgb(width, height),
            width,
            height,
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

/// Encode a semi-transparent RGBA image as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels: Vec<u8> = gradient_rgb(width, height)
        .chunks(3)
        .flat_map(|px| [px[0], px[1], px[2], 200])
        .collect();
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(&pixels, width, height, ExtendedColorType::Rgba8)
        .unwrap();
    buf
}
