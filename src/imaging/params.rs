//! Parameter types for image operations.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between [`operations`](super::operations), which decides the output size,
//! and the [`backend`](super::backend), which does the pixel work.
//!
//! - [`Quality`]: lossy encoding quality as a factor in (0, 1], default 0.72.
//! - [`DrawParams`]: source handle, output size, quality.

use super::backend::SourceHandle;

/// Lossy encoding quality factor.
///
/// Stored as the 0–1 factor a canvas encoder takes; [`jpeg_value`] converts
/// to the 1–100 scale of the JPEG encoder.
///
/// [`jpeg_value`]: Quality::jpeg_value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    /// Clamp to (0, 1]. Non-finite input falls back to the default.
    pub fn new(factor: f32) -> Self {
        if !factor.is_finite() {
            return Self::default();
        }
        Self(factor.clamp(0.01, 1.0))
    }

    pub fn factor(self) -> f32 {
        self.0
    }

    pub fn jpeg_value(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.72)
    }
}

/// Parameters for one draw-and-encode.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawParams {
    pub source: SourceHandle,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0.0).jpeg_value(), 1);
        assert_eq!(Quality::new(0.7).jpeg_value(), 70);
        assert_eq!(Quality::new(3.0).jpeg_value(), 100);
    }

    #[test]
    fn quality_default_is_072() {
        assert_eq!(Quality::default().factor(), 0.72);
        assert_eq!(Quality::default().jpeg_value(), 72);
    }

    #[test]
    fn quality_nan_uses_default() {
        assert_eq!(Quality::new(f32::NAN), Quality::default());
    }
}
