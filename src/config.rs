//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are the base layer; a user `config.toml` overrides any subset of keys.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Raksha Bandhan Tribute | Bond of Rakhi"
//! description = "Celebrate Raksha Bandhan with a heartfelt gallery of sisters and background music."
//! mode = "development"      # or "production" (default follows the build profile)
//! base_path = "/"           # URL prefix for assets in production
//!
//! [storage]
//! key = "rb_sisters"        # Storage key holding the collection
//! quota_bytes = 5242880     # Total bytes the data directory may hold
//!
//! [photos]
//! max_dimension = 1280      # Longest edge of a stored photo, in pixels
//! quality = 0.72            # JPEG quality factor (0-1]
//!
//! [audio]
//! track = "music/rakhi-song.mp3"
//! duration_secs = 0         # Track length for loop position; 0 = unknown
//! autoplay = "allow"        # or "block"
//!
//! [colors]
//! accent = "#c2410c"
//! background = "#fffaf3"
//! text = "#2b1d12"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::assets::{AssetResolver, BuildMode};
use crate::imaging::{CompressOptions, Quality};
use crate::playback::AutoplayPolicy;
use crate::storage::{DEFAULT_QUOTA_BYTES, validate_key};
use crate::store::DEFAULT_KEY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Page metadata and asset URL layout.
    pub site: SiteConfig,
    /// Durable collection storage.
    pub storage: StorageConfig,
    /// Upload compression.
    pub photos: PhotosConfig,
    /// Background music.
    pub audio: AudioConfig,
    /// Page palette.
    pub colors: ColorConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.photos.quality > 0.0 && self.photos.quality <= 1.0) {
            return Err(ConfigError::Validation(
                "photos.quality must be greater than 0 and at most 1".into(),
            ));
        }
        if self.photos.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "photos.max_dimension must be non-zero".into(),
            ));
        }
        if self.storage.quota_bytes == 0 {
            return Err(ConfigError::Validation(
                "storage.quota_bytes must be non-zero".into(),
            ));
        }
        if validate_key(&self.storage.key).is_err() {
            return Err(ConfigError::Validation(format!(
                "storage.key '{}' may only contain letters, digits, '_' and '-'",
                self.storage.key
            )));
        }
        if self.audio.track.trim().is_empty() {
            return Err(ConfigError::Validation("audio.track must not be empty".into()));
        }
        Ok(())
    }

    pub fn asset_resolver(&self) -> AssetResolver {
        AssetResolver::new(self.site.mode, &self.site.base_path)
    }

    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions {
            max_dimension: self.photos.max_dimension,
            quality: Quality::new(self.photos.quality),
        }
    }
}

/// Page metadata and asset URL layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Document `<title>`.
    pub title: String,
    /// Content of the description meta tag.
    pub description: String,
    /// Whether assets resolve against `/` or `base_path`.
    pub mode: BuildMode,
    /// URL prefix for assets when deployed.
    pub base_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Raksha Bandhan Tribute | Bond of Rakhi".to_string(),
            description: "Celebrate Raksha Bandhan with a heartfelt gallery of sisters and background music."
                .to_string(),
            mode: BuildMode::default(),
            base_path: "/".to_string(),
        }
    }
}

/// Durable collection storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Key the collection is stored under.
    pub key: String,
    /// Maximum bytes across all stored keys.
    pub quota_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

/// Upload compression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    /// Longest edge of a stored photo, in pixels.
    pub max_dimension: u32,
    /// JPEG quality factor in (0, 1].
    pub quality: f32,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1280,
            quality: 0.72,
        }
    }
}

/// Background music settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Logical asset path of the looping track.
    pub track: String,
    /// Track length in seconds, used to wrap the loop position. 0 = unknown.
    pub duration_secs: u64,
    /// Whether the environment lets playback start.
    pub autoplay: AutoplayPolicy,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            track: "music/rakhi-song.mp3".to_string(),
            duration_secs: 0,
            autoplay: AutoplayPolicy::Allow,
        }
    }
}

/// Page palette, emitted as CSS custom properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub accent: String,
    pub background: String,
    pub text: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            accent: "#c2410c".to_string(),
            background: "#fffaf3".to_string(),
            text: "#2b1d12".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Rakhi Gal Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Page
# ---------------------------------------------------------------------------
[site]
title = "Raksha Bandhan Tribute | Bond of Rakhi"
description = "Celebrate Raksha Bandhan with a heartfelt gallery of sisters and background music."

# "development" serves assets from /, "production" from base_path.
# When omitted, release builds use "production".
# mode = "production"

# URL prefix for assets in production, e.g. "/rakhi/" on a project page.
base_path = "/"

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Key the collection is stored under.
key = "rb_sisters"

# Writes that would push the data directory past this many bytes fail.
quota_bytes = 5242880

# ---------------------------------------------------------------------------
# Photos
# ---------------------------------------------------------------------------
[photos]
# Uploads are scaled down (never up) so the longest edge fits this size.
max_dimension = 1280

# JPEG quality factor, greater than 0 and at most 1.
quality = 0.72

# ---------------------------------------------------------------------------
# Background music
# ---------------------------------------------------------------------------
[audio]
track = "music/rakhi-song.mp3"

# Track length in seconds; the loop position wraps at this point. 0 = unknown.
duration_secs = 0

# "block" simulates an environment that refuses to start playback.
autoplay = "allow"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
accent = "#c2410c"
background = "#fffaf3"
text = "#2b1d12"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-accent: {accent};
    --color-bg: {background};
    --color-text: {text};
}}"#,
        accent = colors.accent,
        background = colors.background,
        text = colors.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_page_defaults() {
        let config = GalleryConfig::default();
        assert_eq!(config.storage.key, "rb_sisters");
        assert_eq!(config.storage.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.photos.max_dimension, 1280);
        assert_eq!(config.photos.quality, 0.72);
        assert_eq!(config.audio.track, "music/rakhi-song.mp3");
        assert_eq!(config.audio.autoplay, AutoplayPolicy::Allow);
    }

    #[test]
    fn validate_default_config_passes() {
        GalleryConfig::default().validate().unwrap();
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.base_path, "/");
        assert_eq!(config.colors.accent, "#c2410c");
    }

    #[test]
    fn load_config_partial_override() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[site]
mode = "production"
base_path = "/rakhi/"

[photos]
quality = 0.5
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.mode, BuildMode::Production);
        assert_eq!(config.photos.quality, 0.5);
        // Unspecified values keep their defaults
        assert_eq!(config.photos.max_dimension, 1280);
        assert_eq!(config.site.title, "Raksha Bandhan Tribute | Bond of Rakhi");
        assert_eq!(
            config.asset_resolver().resolve("music/rakhi-song.mp3"),
            "/rakhi/music/rakhi-song.mp3"
        );
    }

    #[test]
    fn compress_options_follow_photos_section() {
        let mut config = GalleryConfig::default();
        config.photos.max_dimension = 640;
        config.photos.quality = 0.9;
        let options = config.compress_options();
        assert_eq!(options.max_dimension, 640);
        assert_eq!(options.quality.jpeg_value(), 90);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[photos\nquality = ").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[photos]\nqualty = 0.5\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn unknown_autoplay_value_rejected() {
        let toml = "[audio]\nautoplay = \"sometimes\"\n";
        assert!(toml::from_str::<GalleryConfig>(toml).is_err());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = GalleryConfig::default();
        config.photos.quality = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.photos.quality = 1.0;
        config.validate().unwrap();
        config.photos.quality = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_max_dimension_zero() {
        let mut config = GalleryConfig::default();
        config.photos.max_dimension = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_storage_key() {
        let mut config = GalleryConfig::default();
        config.storage.key = "../sisters".into();
        assert!(config.validate().is_err());
        config.storage.key = "sisters_v2".into();
        config.validate().unwrap();
    }

    #[test]
    fn validate_quota_zero() {
        let mut config = GalleryConfig::default();
        config.storage.quota_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[photos]\nmax_dimension = 0\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: GalleryConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = GalleryConfig::default();
        assert_eq!(parsed.storage.key, defaults.storage.key);
        assert_eq!(parsed.storage.quota_bytes, defaults.storage.quota_bytes);
        assert_eq!(parsed.photos.max_dimension, defaults.photos.max_dimension);
        assert_eq!(parsed.photos.quality, defaults.photos.quality);
        assert_eq!(parsed.audio.track, defaults.audio.track);
        assert_eq!(parsed.colors.accent, defaults.colors.accent);
        assert_eq!(parsed.site.description, defaults.site.description);
    }

    #[test]
    fn color_css_includes_variables() {
        let css = generate_color_css(&ColorConfig::default());
        assert!(css.contains("--color-accent: #c2410c"));
        assert!(css.contains("--color-bg: #fffaf3"));
    }
}
