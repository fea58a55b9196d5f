//! Interactive session: one input line per visitor gesture.
//!
//! ```text
//! add                              open the add dialog (prompts for fields)
//! add <category> <name...> [--photo <path>]
//! remove <id>
//! list [all|real|cousin|vow]       defaults to the active tab
//! tab <all|real|cousin|vow>        switch the gallery tab
//! play                             floating play/pause control
//! hero-play                        hero "Play background music" button
//! status
//! render <dir>                     write the page as it looks right now
//! help
//! quit
//! ```
//!
//! Both play surfaces hold the same [`PlaybackHandle`], so a toggle from one
//! shows up on the other.
//!
//! An add with a photo returns as soon as the compression is started on the
//! rayon pool. Finished compressions are collected before each prompt and
//! the entry is submitted then, with the photo when it could be processed.
//! Photos still in flight when input ends are waited for.

use crate::assets::AssetResolver;
use crate::catalog::Catalog;
use crate::config::GalleryConfig;
use crate::imaging::{
    self, CompressError, CompressEvent, CompressOptions, ImageBackend, compress_in_background,
};
use crate::notify::Notifier;
use crate::output;
use crate::playback::{AudioSink, PlaybackError, PlaybackHandle, PlaybackState};
use crate::render::{self, PageView};
use crate::storage::Storage;
use crate::types::{Category, CategoryFilter, NewEntry};
use maud::Markup;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, error, warn};

pub const PHOTO_OPTIMIZED_MESSAGE: &str = "Photo optimized for storage";
pub const PHOTO_FAILED_MESSAGE: &str = "Could not process the image";

const HELP: &str = "\
Commands:
    add                                  open the add dialog
    add <category> <name...> [--photo <path>]
    remove <id>
    list [all|real|cousin|vow]
    tab <all|real|cousin|vow>
    play                                 floating play/pause control
    hero-play                            hero music button
    status
    render <dir>
    help
    quit";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GestureError {
    #[error("empty input")]
    Empty,
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("{0}")]
    Invalid(String),
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    OpenDialog,
    Add {
        category: Category,
        name: String,
        photo: Option<PathBuf>,
    },
    Remove(String),
    List(Option<CategoryFilter>),
    Tab(CategoryFilter),
    Play,
    HeroPlay,
    Status,
    Render(PathBuf),
    Help,
    Quit,
}

impl FromStr for Gesture {
    type Err = GestureError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(GestureError::Empty);
        };
        let args: Vec<&str> = words.collect();

        match command {
            "add" => parse_add(line.trim_start()[command.len()..].trim()),
            "remove" | "rm" => args
                .first()
                .map(|id| Gesture::Remove(id.to_string()))
                .ok_or(GestureError::Missing("entry id")),
            "list" | "ls" => match args.first() {
                None => Ok(Gesture::List(None)),
                Some(f) => f
                    .parse()
                    .map(|f| Gesture::List(Some(f)))
                    .map_err(GestureError::Invalid),
            },
            "tab" => args
                .first()
                .ok_or(GestureError::Missing("tab name"))?
                .parse()
                .map(Gesture::Tab)
                .map_err(GestureError::Invalid),
            "play" => Ok(Gesture::Play),
            "hero-play" => Ok(Gesture::HeroPlay),
            "status" => Ok(Gesture::Status),
            "render" => args
                .first()
                .map(|dir| Gesture::Render(PathBuf::from(dir)))
                .ok_or(GestureError::Missing("output directory")),
            "help" | "?" => Ok(Gesture::Help),
            "quit" | "exit" => Ok(Gesture::Quit),
            other => Err(GestureError::Unknown(other.to_string())),
        }
    }
}

/// `rest` is the line after `add`. The name keeps its inner spacing; only
/// the ends are trimmed.
fn parse_add(rest: &str) -> Result<Gesture, GestureError> {
    let Some(category) = rest.split_whitespace().next() else {
        return Ok(Gesture::OpenDialog);
    };
    let rest = rest[category.len()..].trim_start();
    let category: Category = category.parse().map_err(GestureError::Invalid)?;

    let (name, photo) = match photo_flag(rest) {
        Some(at) => {
            let path = rest[at + PHOTO_FLAG.len()..].trim();
            if path.is_empty() {
                return Err(GestureError::Missing("photo path"));
            }
            (&rest[..at], Some(PathBuf::from(path)))
        }
        None => (rest, None),
    };
    Ok(Gesture::Add {
        category,
        name: name.trim().to_string(),
        photo,
    })
}

const PHOTO_FLAG: &str = "--photo";

/// Byte offset of a standalone `--photo` word.
fn photo_flag(text: &str) -> Option<usize> {
    text.match_indices(PHOTO_FLAG).map(|(at, _)| at).find(|&at| {
        let before = text[..at].chars().next_back();
        let after = text[at + PHOTO_FLAG.len()..].chars().next();
        before.is_none_or(char::is_whitespace) && after.is_none_or(char::is_whitespace)
    })
}

/// Hero call to action for the music.
pub struct HeroBanner<A, N> {
    playback: PlaybackHandle<A, N>,
}

impl<A: AudioSink, N: Notifier> HeroBanner<A, N> {
    pub fn new(playback: PlaybackHandle<A, N>) -> Self {
        Self { playback }
    }

    pub fn press_music(&self) -> Result<PlaybackState, PlaybackError> {
        self.playback.toggle()
    }

    pub fn render(&self) -> Markup {
        render::hero_banner(self.playback.state())
    }
}

/// The always-visible play/pause control.
pub struct FloatingControl<A, N> {
    playback: PlaybackHandle<A, N>,
}

impl<A: AudioSink, N: Notifier> FloatingControl<A, N> {
    pub fn new(playback: PlaybackHandle<A, N>) -> Self {
        Self { playback }
    }

    pub fn press(&self) -> Result<PlaybackState, PlaybackError> {
        self.playback.toggle()
    }

    pub fn label(&self) -> &'static str {
        if self.playback.is_playing() {
            "Pause"
        } else {
            "Play"
        }
    }

    pub fn render(&self) -> Markup {
        render::floating_control(self.playback.state())
    }
}

/// Read and compress a photo on the calling thread.
///
/// For one-shot commands. Any failure is reported through `notifier` and
/// yields `None`; the entry can still be added without a photo.
pub fn compress_photo<B, N>(
    backend: &B,
    path: &Path,
    options: &CompressOptions,
    notifier: &N,
) -> Option<String>
where
    B: ImageBackend + ?Sized,
    N: Notifier + ?Sized,
{
    let bytes = read_photo(path, notifier)?;
    let result = imaging::compress(backend, &bytes, options);
    photo_outcome(&path.display().to_string(), result, notifier)
}

fn read_photo<N: Notifier + ?Sized>(path: &Path, notifier: &N) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(path = %path.display(), "cannot read photo: {e}");
            notifier.error(PHOTO_FAILED_MESSAGE);
            None
        }
    }
}

/// Toast the result of a compression and keep the data URL if there is one.
fn photo_outcome<N: Notifier + ?Sized>(
    tag: &str,
    result: Result<String, CompressError>,
    notifier: &N,
) -> Option<String> {
    match result {
        Ok(url) => {
            notifier.success(PHOTO_OPTIMIZED_MESSAGE);
            Some(url)
        }
        Err(e) => {
            warn!(photo = %tag, "could not process image: {e}");
            notifier.error(PHOTO_FAILED_MESSAGE);
            None
        }
    }
}

/// An add waiting for its photo.
struct PendingAdd {
    name: String,
    category: Category,
}

pub struct Session<'a, S, A, N, B> {
    config: &'a GalleryConfig,
    assets: AssetResolver,
    assets_dir: Option<PathBuf>,
    catalog: Catalog<S, Rc<N>>,
    hero: HeroBanner<A, Rc<N>>,
    floating: FloatingControl<A, Rc<N>>,
    notifier: Rc<N>,
    backend: Arc<B>,
    active: CategoryFilter,
    photos_tx: Sender<CompressEvent>,
    photos_rx: Receiver<CompressEvent>,
    pending: HashMap<String, PendingAdd>,
    next_photo: u64,
}

impl<'a, S, A, N, B> Session<'a, S, A, N, B>
where
    S: Storage,
    A: AudioSink,
    N: Notifier,
    B: ImageBackend + 'static,
{
    pub fn new(
        config: &'a GalleryConfig,
        catalog: Catalog<S, Rc<N>>,
        playback: PlaybackHandle<A, Rc<N>>,
        notifier: Rc<N>,
        backend: Arc<B>,
    ) -> Self {
        let (photos_tx, photos_rx) = mpsc::channel();
        Self {
            config,
            assets: config.asset_resolver(),
            assets_dir: None,
            catalog,
            hero: HeroBanner::new(Rc::clone(&playback)),
            floating: FloatingControl::new(playback),
            notifier,
            backend,
            active: CategoryFilter::All,
            photos_tx,
            photos_rx,
            pending: HashMap::new(),
            next_photo: 0,
        }
    }

    /// Directory copied next to `index.html` by `render`.
    pub fn with_assets_dir(mut self, dir: PathBuf) -> Self {
        self.assets_dir = Some(dir);
        self
    }

    pub fn catalog(&self) -> &Catalog<S, Rc<N>> {
        &self.catalog
    }

    pub fn active(&self) -> CategoryFilter {
        self.active
    }

    pub fn hero(&self) -> &HeroBanner<A, Rc<N>> {
        &self.hero
    }

    pub fn floating(&self) -> &FloatingControl<A, Rc<N>> {
        &self.floating
    }

    /// Adds still waiting for their photo.
    pub fn pending_photos(&self) -> usize {
        self.pending.len()
    }

    /// Read gestures until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        let merged = self.catalog.initialize();
        debug!(merged, entries = self.catalog.len(), "session started");
        writeln!(out, "{} sisters loaded. Type 'help' for commands.", self.catalog.len())?;

        loop {
            self.poll_photos(out)?;
            write!(out, "> ")?;
            out.flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            match line.parse::<Gesture>() {
                Ok(Gesture::Quit) => break,
                Ok(gesture) => self.dispatch(gesture, &mut input, out)?,
                Err(GestureError::Empty) => {}
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        self.finish_photos(out)
    }

    /// Submit every add whose photo has finished. Never blocks.
    pub fn poll_photos<W: Write>(&mut self, out: &mut W) -> io::Result<usize> {
        let mut done = 0;
        while let Ok(event) = self.photos_rx.try_recv() {
            self.complete_photo(event, out)?;
            done += 1;
        }
        Ok(done)
    }

    /// Wait until every photo in flight has been handled.
    pub fn finish_photos<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        while !self.pending.is_empty() {
            match self.photos_rx.recv() {
                Ok(event) => self.complete_photo(event, out)?,
                Err(_) => break,
            }
        }
        Ok(())
    }

    /// Apply one gesture. `input` is only read by the add dialog.
    pub fn dispatch<R: BufRead, W: Write>(
        &mut self,
        gesture: Gesture,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<()> {
        match gesture {
            Gesture::OpenDialog => self.add_dialog(input, out)?,
            Gesture::Add {
                category,
                name,
                photo,
            } => self.add(category, &name, photo.as_deref(), out)?,
            Gesture::Remove(id) => {
                if self.catalog.remove(&id) {
                    writeln!(out, "Removed {id}")?;
                } else {
                    writeln!(out, "No sister with id {id}")?;
                }
            }
            Gesture::List(filter) => {
                let filter = filter.unwrap_or(self.active);
                write_lines(out, output::format_entries(&self.catalog.filter(filter), filter))?;
            }
            Gesture::Tab(filter) => {
                self.active = filter;
                write_lines(out, output::format_entries(&self.catalog.filter(filter), filter))?;
            }
            Gesture::Play => {
                if self.floating.press().is_ok() {
                    writeln!(out, "Floating control: {}", self.floating.label())?;
                }
            }
            Gesture::HeroPlay => {
                if self.hero.press_music().is_ok() {
                    writeln!(out, "Floating control: {}", self.floating.label())?;
                }
            }
            Gesture::Status => {
                let playback = &self.hero.playback;
                write_lines(
                    out,
                    output::format_status(
                        self.active,
                        &self.catalog.counts(),
                        playback.state(),
                        playback.position(),
                        playback.is_looping(),
                    ),
                )?;
            }
            Gesture::Render(dir) => self.render(&dir, out)?,
            Gesture::Help => writeln!(out, "{HELP}")?,
            Gesture::Quit => {}
        }
        Ok(())
    }

    fn add_dialog<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> io::Result<()> {
        writeln!(out, "Add a Sister")?;
        let name = prompt(input, out, "Name: ")?;
        let category = match prompt(input, out, "Category [real/cousin/vow] (real): ")?.as_str() {
            "" => Category::Real,
            answer => match answer.parse() {
                Ok(category) => category,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    return Ok(());
                }
            },
        };
        let photo = prompt(input, out, "Photo path (optional): ")?;
        let photo = (!photo.is_empty()).then(|| PathBuf::from(photo));
        self.add(category, &name, photo.as_deref(), out)
    }

    fn add<W: Write>(
        &mut self,
        category: Category,
        name: &str,
        photo: Option<&Path>,
        out: &mut W,
    ) -> io::Result<()> {
        match photo {
            Some(path) if !name.trim().is_empty() => self.start_photo(category, name, path, out),
            _ => self.submit(NewEntry::new(name, category), out),
        }
    }

    /// Hand the photo to the rayon pool and return at once.
    fn start_photo<W: Write>(
        &mut self,
        category: Category,
        name: &str,
        path: &Path,
        out: &mut W,
    ) -> io::Result<()> {
        let Some(bytes) = read_photo(path, self.notifier.as_ref()) else {
            return self.submit(NewEntry::new(name, category), out);
        };
        self.next_photo += 1;
        let tag = format!("photo-{}", self.next_photo);
        debug!(%tag, path = %path.display(), "compressing photo");
        self.pending.insert(
            tag.clone(),
            PendingAdd {
                name: name.to_string(),
                category,
            },
        );
        compress_in_background(
            Arc::clone(&self.backend),
            tag,
            bytes,
            self.config.compress_options(),
            self.photos_tx.clone(),
        );
        writeln!(out, "Optimizing photo for {}...", name.trim())
    }

    fn complete_photo<W: Write>(&mut self, event: CompressEvent, out: &mut W) -> io::Result<()> {
        let Some(pending) = self.pending.remove(&event.tag) else {
            warn!(tag = %event.tag, "photo finished for an unknown add");
            return Ok(());
        };
        let mut new = NewEntry::new(pending.name, pending.category);
        if let Some(url) = photo_outcome(&event.tag, event.result, self.notifier.as_ref()) {
            new = new.with_photo(url);
        }
        self.submit(new, out)
    }

    fn submit<W: Write>(&mut self, new: NewEntry, out: &mut W) -> io::Result<()> {
        if let Ok(entry) = self.catalog.add(new) {
            write_lines(out, output::format_entry(1, entry))?;
        }
        Ok(())
    }

    fn render<W: Write>(&self, dir: &Path, out: &mut W) -> io::Result<()> {
        let view = PageView {
            config: self.config,
            assets: &self.assets,
            entries: self.catalog.entries(),
            active: self.active,
            playback: self.hero.playback.state(),
        };
        match render::write_site(&view, self.assets_dir.as_deref(), dir) {
            Ok(summary) => write_lines(out, output::format_build_output(&summary, dir)),
            Err(e) => {
                error!(output = %dir.display(), "render failed: {e}");
                writeln!(out, "render failed: {e}")
            }
        }
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> io::Result<String> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn write_lines<W: Write>(out: &mut W, lines: Vec<String>) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
