//! Gallery records shared by the store, catalog, and renderer.
//!
//! [`Entry`] is serialized to durable storage exactly as the page reads it
//! back, so field names follow the stored layout (`createdAt`, optional
//! `photo`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed classification of an entry.
///
/// The stored values are `real`, `cousin` and `vow`. The generic names
/// `primary`, `secondary` and `honorary` are accepted as aliases when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "primary")]
    Real,
    #[serde(alias = "secondary")]
    Cousin,
    #[serde(alias = "honorary", alias = "chosen")]
    Vow,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Real, Category::Cousin, Category::Vow];

    /// Value written to storage and used in CSS class names.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Real => "real",
            Category::Cousin => "cousin",
            Category::Vow => "vow",
        }
    }

    /// Badge text shown on a gallery card.
    pub fn label(self) -> &'static str {
        match self {
            Category::Real => "Real Sister",
            Category::Cousin => "Cousin Sister",
            Category::Vow => "Chosen Sister",
        }
    }

    /// Short label used by the gallery tabs.
    pub fn tab_label(self) -> &'static str {
        match self {
            Category::Real => "Real",
            Category::Cousin => "Cousin",
            Category::Vow => "Chosen Sister",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "real" | "primary" => Ok(Category::Real),
            "cousin" | "secondary" => Ok(Category::Cousin),
            "vow" | "chosen" | "honorary" => Ok(Category::Vow),
            other => Err(format!(
                "unknown category '{other}' (expected real, cousin or vow)"
            )),
        }
    }
}

/// Either every entry or a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    /// Tab identifier: `all` or the category value.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(c: Category) -> Self {
        CategoryFilter::Only(c)
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// One gallery record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Opaque identifier, unique within the collection.
    pub id: String,
    /// Display name, never empty after trimming.
    pub name: String,
    pub category: Category,
    /// `data:` URL of a compressed upload, or an asset URL for seed photos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

/// What a visitor submits from the add dialog, before an id and timestamp
/// are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub name: String,
    pub category: Category,
    pub photo: Option<String>,
}

impl NewEntry {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }
}
