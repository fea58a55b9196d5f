//! Built-in entries merged into every collection on startup.

use crate::assets::AssetResolver;
use crate::types::{Category, Entry};

struct SeedEntry {
    id: &'static str,
    name: &'static str,
    category: Category,
    photo: &'static str,
    /// How long before session start the entry counts as created.
    age_ms: i64,
}

const SEED: &[SeedEntry] = &[
    SeedEntry {
        id: "sneha-dido",
        name: "Sneha (Dido)",
        category: Category::Real,
        photo: "sneha.jpeg",
        age_ms: 3000,
    },
    SeedEntry {
        id: "shreya-sheru",
        name: "Shreya Bhangi (Sheru Jabali)",
        category: Category::Vow,
        photo: "shreya bhangi.jpeg",
        age_ms: 2000,
    },
    SeedEntry {
        id: "kritika-khushi",
        name: "Kritika (Khushi) 🐸",
        category: Category::Cousin,
        photo: "khushi and sneha.jpeg",
        age_ms: 1000,
    },
    SeedEntry {
        id: "manasvi",
        name: "Manasvi",
        category: Category::Vow,
        photo: "manasvi.jpeg",
        age_ms: 0,
    },
];

/// The seed set, with photo URLs resolved and timestamps relative to
/// `session_start_ms`.
pub fn seed_entries(assets: &AssetResolver, session_start_ms: i64) -> Vec<Entry> {
    SEED.iter()
        .map(|s| Entry {
            id: s.id.to_string(),
            name: s.name.to_string(),
            category: s.category,
            photo: Some(assets.upload_url(s.photo)),
            created_at: session_start_ms - s.age_ms,
        })
        .collect()
}

/// File names of the seed photos, relative to the uploads directory.
pub fn seed_photo_files() -> impl Iterator<Item = &'static str> {
    SEED.iter().map(|s| s.photo)
}
