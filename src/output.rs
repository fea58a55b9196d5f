//! CLI output formatting.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Sisters (all, 3)
//! 001 Sneha (Dido) [Real Sister]
//!     Id: sneha-dido
//!     Photo: /uploads/sneha.jpeg
//! 002 Priya [Cousin Sister]
//!     Id: 6f1c...
//!     Photo: embedded JPEG, 48.2 KB
//! 003 Asha [Chosen Sister]
//!     Id: 0b7e...
//! ```
//!
//! ## Build
//!
//! ```text
//! index.html → dist/index.html
//!     Entries: 5
//!     Assets copied: 6
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::imaging::DATA_URL_PREFIX;
use crate::notify::Level;
use crate::playback::PlaybackState;
use crate::render::SiteSummary;
use crate::types::{Category, CategoryFilter, Entry};
use std::path::Path;
use std::time::Duration;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_kb(bytes: usize) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// Describe a photo without dumping a data URL to the terminal.
fn describe_photo(photo: &str) -> String {
    match photo.strip_prefix(DATA_URL_PREFIX) {
        // base64 carries 3 bytes per 4 characters
        Some(payload) => format!("embedded JPEG, {}", format_kb(payload.len() / 4 * 3)),
        None => photo.to_string(),
    }
}

/// One notification line.
pub fn format_toast(level: Level, message: &str) -> String {
    match level {
        Level::Success => format!("✓ {message}"),
        Level::Error => format!("✗ {message}"),
    }
}

/// Header line plus details for one entry.
pub fn format_entry(index: usize, entry: &Entry) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} {} [{}]",
            format_index(index),
            entry.name,
            entry.category.label()
        ),
        format!("{}Id: {}", indent(1), entry.id),
    ];
    if let Some(photo) = &entry.photo {
        lines.push(format!("{}Photo: {}", indent(1), describe_photo(photo)));
    }
    lines
}

/// A filtered listing of entries.
pub fn format_entries(entries: &[&Entry], filter: CategoryFilter) -> Vec<String> {
    let mut lines = vec![format!("Sisters ({}, {})", filter.as_str(), entries.len())];
    if entries.is_empty() {
        lines.push(format!("{}No sisters found.", indent(1)));
    }
    for (i, entry) in entries.iter().enumerate() {
        lines.extend(format_entry(i + 1, entry));
    }
    lines
}

pub fn format_playback(state: PlaybackState, position: Duration, looping: bool) -> String {
    let secs = position.as_secs();
    let repeat = if looping { ", on loop" } else { "" };
    match state {
        PlaybackState::Playing => {
            format!("Music: playing ({}:{:02}{repeat})", secs / 60, secs % 60)
        }
        PlaybackState::Paused => "Music: paused".to_string(),
    }
}

/// Session status: active tab, per-category counts and the music state.
pub fn format_status(
    active: CategoryFilter,
    counts: &[(Category, usize)],
    playback: PlaybackState,
    position: Duration,
    looping: bool,
) -> Vec<String> {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let mut lines = vec![format!("Tab: {} ({} sisters)", active.as_str(), total)];
    for (category, count) in counts {
        lines.push(format!("{}{}: {}", indent(1), category.tab_label(), count));
    }
    lines.push(format_playback(playback, position, looping));
    lines
}

pub fn format_build_output(summary: &SiteSummary, output_dir: &Path) -> Vec<String> {
    vec![
        format!(
            "index.html → {}",
            output_dir.join("index.html").display()
        ),
        format!("{}Entries: {}", indent(1), summary.entries),
        format!("{}Assets copied: {}", indent(1), summary.assets_copied),
    ]
}

pub fn print_entries(entries: &[&Entry], filter: CategoryFilter) {
    for line in format_entries(entries, filter) {
        println!("{}", line);
    }
}

pub fn print_entry(entry: &Entry) {
    for line in format_entry(1, entry) {
        println!("{}", line);
    }
}

pub fn print_build_output(summary: &SiteSummary, output_dir: &Path) {
    for line in format_build_output(summary, output_dir) {
        println!("{}", line);
    }
}
