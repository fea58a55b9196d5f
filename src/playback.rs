//! Background music: one shared play/pause state.
//!
//! ```text
//!            toggle / play ok
//!   Paused ───────────────────▶ Playing
//!     ▲  │                         │
//!     │  └─ play rejected ─┐       │ toggle / stop
//!     │    (notify, stay)  │       │
//!     └────────────────────┴───────┘
//! ```
//!
//! The [`PlaybackCoordinator`] owns both the state and the [`AudioSink`].
//! Surfaces (hero button, floating control) receive a [`PlaybackHandle`]
//! and can only query or toggle; the state itself is private. Because every
//! surface holds the same handle, a toggle from one is immediately visible
//! to all of them.

use crate::notify::Notifier;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

pub const PLAY_FAILED_MESSAGE: &str = "Unable to play audio";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("audio not ready: {0}")]
    NotReady(String),
    #[error("playback blocked by autoplay policy")]
    Blocked,
}

/// The audio resource being coordinated.
pub trait AudioSink {
    /// Start (or resume) looping playback.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Stop playback and rewind to the start of the track.
    fn stop(&mut self);

    /// Current offset within the track.
    fn position(&self) -> Duration;

    /// Whether playback restarts from the beginning when the track ends.
    fn is_looping(&self) -> bool;
}

/// Shared reference handed to every surface.
pub type PlaybackHandle<A, N> = Rc<PlaybackCoordinator<A, N>>;

pub struct PlaybackCoordinator<A, N> {
    state: Cell<PlaybackState>,
    sink: RefCell<A>,
    notifier: N,
}

impl<A: AudioSink, N: Notifier> PlaybackCoordinator<A, N> {
    pub fn new(sink: A, notifier: N) -> Self {
        Self {
            state: Cell::new(PlaybackState::Paused),
            sink: RefCell::new(sink),
            notifier,
        }
    }

    /// Wrap a new coordinator in a shareable handle.
    pub fn shared(sink: A, notifier: N) -> PlaybackHandle<A, N> {
        Rc::new(Self::new(sink, notifier))
    }

    pub fn state(&self) -> PlaybackState {
        self.state.get()
    }

    pub fn is_playing(&self) -> bool {
        self.state.get() == PlaybackState::Playing
    }

    pub fn position(&self) -> Duration {
        self.sink.borrow().position()
    }

    pub fn is_looping(&self) -> bool {
        self.sink.borrow().is_looping()
    }

    /// Flip between paused and playing.
    ///
    /// Starting can be rejected by the sink; the state then stays
    /// [`Paused`](PlaybackState::Paused), one notification is raised and the
    /// error is returned. There is no retry. Stopping cannot fail.
    pub fn toggle(&self) -> Result<PlaybackState, PlaybackError> {
        match self.state.get() {
            PlaybackState::Playing => {
                self.sink.borrow_mut().stop();
                self.state.set(PlaybackState::Paused);
                debug!("playback paused");
            }
            PlaybackState::Paused => {
                let started = self.sink.borrow_mut().play();
                if let Err(e) = started {
                    warn!("unable to play audio: {e}");
                    self.notifier.error(PLAY_FAILED_MESSAGE);
                    return Err(e);
                }
                self.state.set(PlaybackState::Playing);
                debug!("playback started");
            }
        }
        Ok(self.state.get())
    }

    /// Run `f` against the sink (inspection only).
    pub fn with_sink<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&self.sink.borrow())
    }
}

/// Whether the environment lets playback start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoplayPolicy {
    #[default]
    Allow,
    Block,
}

/// A single track file played on an endless loop.
///
/// The sink is ready once its file exists. Position is wall-clock time since
/// `play`, wrapped at the track duration when one is known.
#[derive(Debug)]
pub struct LoopingTrack {
    path: PathBuf,
    duration: Option<Duration>,
    policy: AutoplayPolicy,
    started: Option<Instant>,
}

impl LoopingTrack {
    pub fn new(path: &Path, policy: AutoplayPolicy) -> Self {
        Self {
            path: path.to_path_buf(),
            duration: None,
            policy,
            started: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    fn offset(&self, elapsed: Duration) -> Duration {
        match self.duration {
            Some(d) if !d.is_zero() => {
                Duration::from_nanos((elapsed.as_nanos() % d.as_nanos()) as u64)
            }
            _ => elapsed,
        }
    }
}

impl AudioSink for LoopingTrack {
    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.policy == AutoplayPolicy::Block {
            return Err(PlaybackError::Blocked);
        }
        if !self.path.is_file() {
            return Err(PlaybackError::NotReady(format!(
                "{} not found",
                self.path.display()
            )));
        }
        self.started.get_or_insert_with(Instant::now);
        Ok(())
    }

    fn stop(&mut self) {
        self.started = None;
    }

    fn position(&self) -> Duration {
        self.started
            .map(|t| self.offset(t.elapsed()))
            .unwrap_or_default()
    }

    fn is_looping(&self) -> bool {
        true
    }
}
