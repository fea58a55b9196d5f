//! HTML rendering of the tribute page.
//!
//! The page is a snapshot of the catalog and playback state at render time:
//!
//! | Surface | Function | Renders |
//! |---|---|---|
//! | Hero banner | [`hero_banner`] | headline, intro, add / music buttons |
//! | Gallery grid | [`gallery`] | category tabs, one card per entry |
//! | Floating control | [`floating_control`] | play/pause label from [`PlaybackState`] |
//! | Document | [`render_page`] | title, description meta, JSON-LD, `<audio loop>` |
//!
//! Cards outside the active tab are emitted with `hidden` so the page's
//! script can switch tabs without a rebuild.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── music/rakhi-song.mp3     # copied from the assets directory
//! └── uploads/sneha.jpeg
//! ```
//!
//! Static CSS and script are embedded at compile time from `static/`.

use crate::assets::AssetResolver;
use crate::config::{self, GalleryConfig};
use crate::playback::PlaybackState;
use crate::types::{Category, CategoryFilter, Entry};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/page.js");

const PAGE_NAME: &str = "Raksha Bandhan Tribute";

/// Everything a render needs.
pub struct PageView<'a> {
    pub config: &'a GalleryConfig,
    pub assets: &'a AssetResolver,
    pub entries: &'a [Entry],
    pub active: CategoryFilter,
    pub playback: PlaybackState,
}

/// What [`write_site`] produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SiteSummary {
    pub entries: usize,
    pub assets_copied: usize,
}

/// Render the complete document.
pub fn render_page(view: &PageView) -> Result<Markup, RenderError> {
    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&view.config.colors),
        CSS_STATIC
    );
    let json_ld = structured_data_json(view.entries)?;
    let track_url = view.assets.resolve(&view.config.audio.track);

    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (view.config.site.title) }
                meta name="description" content=(view.config.site.description);
                style { (PreEscaped(css)) }
                script type="application/ld+json" { (PreEscaped(json_ld)) }
            }
            body {
                header.site-header.container {
                    nav {
                        a.brand href="#" { "Bond of Rakhi" }
                        a href="#gallery" { "Gallery" }
                    }
                }
                main.container id="main" {
                    (hero_banner(view.playback))
                    div id="add-sister-anchor" {}
                    section id="gallery" aria-label="Sisters Gallery" {
                        (gallery(view.entries, view.active))
                    }
                }
                (floating_control(view.playback))
                audio id="bg-audio" src=(track_url) loop preload="metadata" {}
                script { (PreEscaped(JS)) }
            }
        }
    })
}

/// Hero banner with the two calls to action.
pub fn hero_banner(playback: PlaybackState) -> Markup {
    html! {
        section.hero aria-label="Raksha Bandhan Hero" {
            span.hero-kicker { "Bond of Love • Raksha Bandhan" }
            h1 { (PAGE_NAME) }
            p {
                "Celebrate the unbreakable bond with a beautiful gallery of your sisters. "
                "Upload photographs and set a special song to play in the background."
            }
            div.hero-actions {
                a.button.primary href="#add-sister-anchor" { "Add Sisters" }
                button.button type="button" data-music-toggle
                    aria-pressed=(aria_bool(playback == PlaybackState::Playing)) {
                    "Play background music"
                }
            }
        }
    }
}

/// Category tabs and the card grid.
pub fn gallery(entries: &[Entry], active: CategoryFilter) -> Markup {
    let visible = entries.iter().filter(|e| active.matches(e.category)).count();
    let tabs = std::iter::once((CategoryFilter::All, "All", entries.len())).chain(
        Category::ALL.iter().map(|&c| {
            let count = entries.iter().filter(|e| e.category == c).count();
            (CategoryFilter::Only(c), c.tab_label(), count)
        }),
    );

    html! {
        div.tabs role="tablist" {
            @for (filter, label, count) in tabs {
                button.tab type="button" role="tab" data-tab=(filter.as_str())
                    aria-selected=(aria_bool(filter == active)) {
                    (label) span.count { (count) }
                }
            }
        }
        div.empty id="gallery-empty" hidden[visible != 0] { "No sisters found." }
        div.grid {
            @for entry in entries {
                (card(entry, !active.matches(entry.category)))
            }
        }
    }
}

fn card(entry: &Entry, hidden: bool) -> Markup {
    html! {
        article.card data-category=(entry.category.as_str()) data-id=(entry.id) hidden[hidden] {
            div.card-header {
                h3.card-title title=(entry.name) { (entry.name) }
                span class={ "badge badge-" (entry.category.as_str()) } { (entry.category.label()) }
            }
            div.photo {
                @if let Some(photo) = &entry.photo {
                    img src=(photo) alt={ (entry.name) " photo" } loading="lazy";
                } @else {
                    div.photo-placeholder aria-hidden="true" { "✿" }
                }
            }
        }
    }
}

/// Floating play/pause control. The label reflects the shared state.
pub fn floating_control(playback: PlaybackState) -> Markup {
    let playing = playback == PlaybackState::Playing;
    html! {
        div.floating-player role="region" aria-label="Background music" {
            span aria-hidden="true" { "♪" }
            button.button.primary type="button" data-music-toggle aria-pressed=(aria_bool(playing)) {
                span data-music-label data-play="Play" data-pause="Pause" {
                    @if playing { "Pause" } @else { "Play" }
                }
            }
        }
    }
}

fn aria_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// schema.org `CollectionPage` listing every entry as a `Person`.
pub fn structured_data(entries: &[Entry]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            serde_json::json!({
                "@type": "Person",
                "name": e.name,
                "position": i + 1,
            })
        })
        .collect();
    serde_json::json!({
        "@context": "https://schema.org",
        "@type": "CollectionPage",
        "name": PAGE_NAME,
        "mainEntity": {
            "@type": "ItemList",
            "itemListElement": items,
        },
    })
}

/// JSON-LD text safe to embed in a `<script>` element.
fn structured_data_json(entries: &[Entry]) -> Result<String, RenderError> {
    let json = serde_json::to_string(&structured_data(entries))?;
    Ok(json.replace("</", "<\\/"))
}

/// Write `index.html` and copy the assets directory into `output_dir`.
pub fn write_site(
    view: &PageView,
    assets_dir: Option<&Path>,
    output_dir: &Path,
) -> Result<SiteSummary, RenderError> {
    fs::create_dir_all(output_dir)?;
    let page = render_page(view)?;
    fs::write(output_dir.join("index.html"), page.into_string())?;
    debug!(entries = view.entries.len(), "wrote index.html");

    let assets_copied = match assets_dir {
        Some(dir) if dir.is_dir() => copy_assets(dir, output_dir)?,
        _ => 0,
    };
    info!(output = %output_dir.display(), assets_copied, "site written");

    Ok(SiteSummary {
        entries: view.entries.len(),
        assets_copied,
    })
}

fn copy_assets(src: &Path, dst: &Path) -> Result<usize, RenderError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
