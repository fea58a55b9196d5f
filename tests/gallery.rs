//! End-to-end checks through the public API: a file-backed collection that
//! survives restarts, photo compression with the real backend, shared
//! playback, and a rendered page.
//!
//! Run with: cargo test --test gallery

use rakhi_gal::assets::{AssetResolver, BuildMode};
use rakhi_gal::catalog::{Catalog, now_ms};
use rakhi_gal::config::GalleryConfig;
use rakhi_gal::imaging::{self, CompressOptions, RustBackend};
use rakhi_gal::notify::RecordingNotifier;
use rakhi_gal::playback::{
    AudioSink, PLAY_FAILED_MESSAGE, PlaybackCoordinator, PlaybackError, PlaybackState,
};
use rakhi_gal::render::{self, PageView};
use rakhi_gal::seed;
use rakhi_gal::storage::{FileStorage, MemoryStorage};
use rakhi_gal::store::{CollectionStore, DEFAULT_KEY, QUOTA_MESSAGE};
use rakhi_gal::types::{Category, CategoryFilter, NewEntry};
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

fn file_catalog<'a>(
    dir: &Path,
    quota: usize,
    notifier: &'a RecordingNotifier,
) -> Catalog<FileStorage, &'a RecordingNotifier> {
    let storage = FileStorage::open(dir, quota).unwrap();
    let store = CollectionStore::new(storage, notifier, DEFAULT_KEY);
    let assets = AssetResolver::new(BuildMode::Development, "/");
    Catalog::new(store, seed::seed_entries(&assets, now_ms()))
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

#[test]
fn collection_survives_restart_without_duplicating_seed() {
    let tmp = tempfile::TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();

    let added_id = {
        let mut catalog = file_catalog(tmp.path(), 5 * 1024 * 1024, &notifier);
        assert_eq!(catalog.initialize(), 4);
        let id = catalog
            .add(NewEntry::new("Priya", Category::Cousin))
            .unwrap()
            .id
            .clone();
        assert!(catalog.remove("manasvi"));
        id
    };

    let mut catalog = file_catalog(tmp.path(), 5 * 1024 * 1024, &notifier);
    // Manasvi was removed, so the merge brings her back; the rest are present.
    assert_eq!(catalog.initialize(), 1);
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog.get(&added_id).unwrap().name, "Priya");
    assert_eq!(catalog.filter(CategoryFilter::Only(Category::Vow)).len(), 2);
}

#[test]
fn quota_failure_notifies_once_and_keeps_memory_copy() {
    let notifier = RecordingNotifier::new();
    let store = CollectionStore::new(MemoryStorage::with_quota(256), &notifier, DEFAULT_KEY);
    let mut catalog = Catalog::new(store, Vec::new());
    catalog.initialize();

    for i in 0..4 {
        let photo = format!("{}{}", imaging::DATA_URL_PREFIX, "A".repeat(200));
        catalog
            .add(NewEntry::new(format!("Sister {i}"), Category::Real).with_photo(photo))
            .unwrap();
    }

    assert_eq!(catalog.len(), 4);
    assert_eq!(notifier.errors(), vec![QUOTA_MESSAGE.to_string()]);
}

#[test]
fn large_photo_is_shrunk_to_max_dimension() {
    let options = CompressOptions::default();
    let url = imaging::compress(&RustBackend::new(), &jpeg(3000, 2000), &options).unwrap();
    let bytes = imaging::decode_data_url(&url).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1280, 853));
}

#[test]
fn small_photo_is_not_upscaled() {
    let url = imaging::compress(
        &RustBackend::new(),
        &jpeg(300, 200),
        &CompressOptions::default(),
    )
    .unwrap();
    let decoded = image::load_from_memory(&imaging::decode_data_url(&url).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (300, 200));
}

#[test]
fn non_image_bytes_fail_to_decode() {
    let err = imaging::compress(
        &RustBackend::new(),
        b"definitely not an image",
        &CompressOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, imaging::CompressError::Decode(_)));
}

struct Speaker {
    refuse_first: bool,
    started: bool,
}

impl AudioSink for Speaker {
    fn play(&mut self) -> Result<(), PlaybackError> {
        if std::mem::take(&mut self.refuse_first) {
            return Err(PlaybackError::Blocked);
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn position(&self) -> Duration {
        Duration::ZERO
    }

    fn is_looping(&self) -> bool {
        true
    }
}

#[test]
fn playback_is_shared_and_recovers_after_refusal() {
    let notifier = Rc::new(RecordingNotifier::new());
    let sink = Speaker {
        refuse_first: true,
        started: false,
    };
    let hero = PlaybackCoordinator::shared(sink, Rc::clone(&notifier));
    let floating = Rc::clone(&hero);

    assert_eq!(hero.toggle(), Err(PlaybackError::Blocked));
    assert_eq!(floating.state(), PlaybackState::Paused);
    assert_eq!(notifier.errors(), vec![PLAY_FAILED_MESSAGE.to_string()]);

    assert_eq!(floating.toggle(), Ok(PlaybackState::Playing));
    assert!(hero.is_playing());
    hero.with_sink(|s| assert!(s.started));
}

#[test]
fn built_site_lists_every_entry() {
    let tmp = tempfile::TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();
    let mut catalog = file_catalog(&tmp.path().join("data"), 5 * 1024 * 1024, &notifier);
    catalog.initialize();

    let config = GalleryConfig::default();
    let assets = AssetResolver::new(BuildMode::Production, "/rakhi");
    let view = PageView {
        config: &config,
        assets: &assets,
        entries: catalog.entries(),
        active: CategoryFilter::All,
        playback: PlaybackState::Paused,
    };
    let out = tmp.path().join("dist");
    let summary = render::write_site(&view, None, &out).unwrap();
    assert_eq!(summary.entries, 4);

    let html = std::fs::read_to_string(out.join("index.html")).unwrap();
    assert!(html.contains("Shreya Bhangi (Sheru Jabali)"));
    assert!(html.contains("/rakhi/music/rakhi-song.mp3"));
    assert!(html.contains("\"@type\":\"CollectionPage\""));
}
