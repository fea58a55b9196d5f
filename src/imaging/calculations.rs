//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `source` inside a `max_dimension` square, preserving aspect ratio.
///
/// The scale factor is `min(1, max_dimension / max(width, height))`, so
/// images already within bounds keep their size. Each output edge is rounded
/// and kept at least 1 px. A `max_dimension` of 0 is treated as 1.
///
/// # Examples
/// ```
/// # use rakhi_gal::imaging::fit_within;
/// // 4000x3000 photo into 1280 → 1280x960
/// assert_eq!(fit_within((4000, 3000), 1280), (1280, 960));
///
/// // Small images are never upscaled
/// assert_eq!(fit_within((640, 480), 1280), (640, 480));
/// ```
pub fn fit_within(source: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let (w, h) = source;
    let max_dimension = max_dimension.max(1);
    let longer = w.max(h);
    if longer == 0 || longer <= max_dimension {
        return (w, h);
    }

    let scale = max_dimension as f64 / longer as f64;
    let scaled = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, max_dimension);
    (scaled(w), scaled(h))
}
