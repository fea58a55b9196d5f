//! Asset URL resolution.
//!
//! Every static file the page references (the background track, seed photos)
//! is addressed by a logical path such as `music/rakhi-song.mp3`. Where that
//! file lives depends on how the page is served:
//!
//! | Mode | `music/rakhi-song.mp3` resolves to |
//! |---|---|
//! | development | `/music/rakhi-song.mp3` |
//! | production, base `/rakhi/` | `/rakhi/music/rakhi-song.mp3` |
//!
//! The default mode is baked in at compile time by `build.rs` (release
//! builds are `production`), and `site.mode` in `config.toml` overrides it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Directory holding the photos bundled with the seed set.
const UPLOADS_DIR: &str = "uploads";

/// Where the generated page is going to be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// The mode selected by the compiling profile.
    pub fn compiled() -> Self {
        match env!("RAKHI_GAL_BUILD_MODE") {
            "production" => BuildMode::Production,
            _ => BuildMode::Development,
        }
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        Self::compiled()
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Development => f.write_str("development"),
            BuildMode::Production => f.write_str("production"),
        }
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            other => Err(format!("unknown build mode '{other}'")),
        }
    }
}

/// Maps logical asset paths to URLs for the current [`BuildMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    mode: BuildMode,
    base_path: String,
}

impl AssetResolver {
    /// Create a resolver. `base_path` only matters in production; a missing
    /// trailing slash is added so `"/rakhi"` and `"/rakhi/"` behave the same.
    pub fn new(mode: BuildMode, base_path: &str) -> Self {
        let base_path = if base_path.is_empty() {
            "/".to_string()
        } else if base_path.ends_with('/') {
            base_path.to_string()
        } else {
            format!("{base_path}/")
        };
        Self { mode, base_path }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Resolve a logical path. A single leading `/` is ignored.
    pub fn resolve(&self, logical_path: &str) -> String {
        let clean = logical_path.strip_prefix('/').unwrap_or(logical_path);
        match self.mode {
            BuildMode::Development => format!("/{clean}"),
            BuildMode::Production => format!("{}{clean}", self.base_path),
        }
    }

    /// URL of a photo shipped in the uploads directory.
    pub fn upload_url(&self, filename: &str) -> String {
        self.resolve(&format!("{UPLOADS_DIR}/{filename}"))
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new(BuildMode::default(), "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_prefixes_root() {
        let r = AssetResolver::new(BuildMode::Development, "/ignored/");
        assert_eq!(r.resolve("music/rakhi-song.mp3"), "/music/rakhi-song.mp3");
    }

    #[test]
    fn leading_slash_is_stripped_once() {
        let r = AssetResolver::new(BuildMode::Development, "/");
        assert_eq!(r.resolve("/music/a.mp3"), "/music/a.mp3");
        assert_eq!(r.resolve("//music/a.mp3"), "//music/a.mp3");
    }

    #[test]
    fn production_uses_base_path() {
        let r = AssetResolver::new(BuildMode::Production, "/rakhi/");
        assert_eq!(r.resolve("/music/a.mp3"), "/rakhi/music/a.mp3");
    }

    #[test]
    fn production_base_gets_trailing_slash() {
        let r = AssetResolver::new(BuildMode::Production, "/rakhi");
        assert_eq!(r.resolve("music/a.mp3"), "/rakhi/music/a.mp3");
    }

    #[test]
    fn production_empty_base_is_root() {
        let r = AssetResolver::new(BuildMode::Production, "");
        assert_eq!(r.resolve("music/a.mp3"), "/music/a.mp3");
    }

    #[test]
    fn upload_url_points_into_uploads() {
        let r = AssetResolver::new(BuildMode::Production, "/gal/");
        assert_eq!(r.upload_url("sneha.jpeg"), "/gal/uploads/sneha.jpeg");
    }

    #[test]
    fn build_mode_parses_short_forms() {
        assert_eq!("dev".parse::<BuildMode>().unwrap(), BuildMode::Development);
        assert_eq!("Production".parse::<BuildMode>().unwrap(), BuildMode::Production);
        assert!("staging".parse::<BuildMode>().is_err());
    }
}
