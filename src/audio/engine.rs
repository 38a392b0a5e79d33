//! The playback capability consumed by the player controller.
//!
//! `PlaybackEngine` is the mutating side and is only driven from the UI
//! thread. `EngineProbe` is the read-only side handed to the progress
//! poller; it has to be shareable across threads.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(#[from] rodio::StreamError),

    #[error("could not open audio sink: {0}")]
    Sink(#[from] rodio::PlayError),

    #[error("could not open file: {0}")]
    Open(#[from] io::Error),

    #[error("unsupported or corrupt audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("no file loaded")]
    NothingLoaded,
}

/// What the engine reports about the audio currently queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus {
    /// Audio is queued and not paused.
    pub busy: bool,
    /// Absolute position within the loaded file.
    pub elapsed: Duration,
}

/// How `resume` got audio going again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumed {
    /// The paused sink carried on from where it stopped.
    Continued,
    /// Nothing was queued, so the staged file started over from the beginning.
    Restarted,
}

pub trait EngineProbe: Send + Sync {
    /// `None` when the state cannot be read right now.
    fn status(&self) -> Option<EngineStatus>;
}

pub trait PlaybackEngine {
    /// Stage `path` for playback. The file must open and decode, otherwise
    /// nothing is staged.
    fn load(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Start the staged file from `start` (the beginning when `None`).
    fn play(&mut self, start: Option<Duration>) -> Result<(), EngineError>;

    fn pause(&mut self);

    /// Continue after `pause`. Restarts the staged file if nothing is queued.
    fn resume(&mut self) -> Result<Resumed, EngineError>;

    fn stop(&mut self);

    /// `level` is on a 0.0-1.0 scale.
    fn set_volume(&mut self, level: f32);

    fn probe(&self) -> Arc<dyn EngineProbe>;
}
