//! # Rakhi Gal
//!
//! A Raksha Bandhan tribute gallery. Visitors add "sisters" under one of
//! three categories, optionally with a photo that is shrunk to a compact
//! JPEG, and a single looping song plays behind the page.
//!
//! # Architecture
//!
//! Everything runs on one logical thread. Components are wired leaf-first:
//!
//! ```text
//! AssetResolver ─┬─▶ seed entries ─┐
//!                │                 ▼
//! Storage ─▶ CollectionStore ─▶ Catalog ─┐
//!                                        ├─▶ Session (gestures) ─▶ render (HTML)
//! AudioSink ─▶ PlaybackCoordinator ──────┘
//!                 ▲ shared by HeroBanner and FloatingControl
//! ImageBackend ─▶ compress (rayon, one event per request)
//! ```
//!
//! Visible feedback goes through a [`notify::Notifier`]; diagnostics go to
//! `tracing`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`assets`] | Logical asset path to environment-correct URL |
//! | [`types`] | `Entry`, `Category`, `CategoryFilter` |
//! | [`storage`] | Key-value port with in-memory and quota-enforcing file backends |
//! | [`store`] | Load/save of the whole collection under one key |
//! | [`imaging`] | Decode, fit within a maximum edge, re-encode as a JPEG data URL |
//! | [`seed`] | Built-in entries merged into every collection |
//! | [`catalog`] | The in-memory collection: seed merge, add, remove, filter |
//! | [`playback`] | Shared play/pause state over an audio sink |
//! | [`notify`] | Transient visitor notifications |
//! | [`render`] | Maud rendering of hero, gallery, floating control and page |
//! | [`session`] | Interactive gesture loop driving catalog and playback |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Whole-Collection Writes
//!
//! The collection is small and every mutation rewrites it in full. There is
//! no partial update path to keep consistent with the in-memory copy.
//!
//! ## Storage Failures Are Not Fatal
//!
//! A full store or an unreadable value never stops the gallery. The in-memory
//! collection stays authoritative for the session and the visitor is told
//! once.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup is
//! a build error and every interpolation is auto-escaped, which matters
//! because entry names are visitor input.

pub mod assets;
pub mod catalog;
pub mod config;
pub mod imaging;
pub mod notify;
pub mod output;
pub mod playback;
pub mod render;
pub mod seed;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
