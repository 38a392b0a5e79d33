use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::audio::engine::{EngineError, EngineProbe, PlaybackEngine, Resumed};
use crate::audio::progress::{ProgressEvent, ProgressUpdate};
use crate::error::AppError;
use crate::track::Track;
use crate::utils::metadata;

/// What the progress poller needs to know about the controller.
///
/// `generation` changes on every published transition. Events the poller
/// sampled under an older generation describe a transport that no longer
/// exists and are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transport {
    pub playing: bool,
    pub duration: Duration,
    pub generation: u64,
}

pub type SharedTransport = Arc<Mutex<Transport>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Paused,
    Playing,
}

#[derive(Debug, Clone)]
struct Current {
    track: Track,
    duration: Duration,
}

pub struct PlayerController<E: PlaybackEngine> {
    engine: E,
    probe: Arc<dyn EngineProbe>,
    read_duration: fn(&Path) -> Duration,
    current: Option<Current>,
    /// File the engine holds. Differs from `current` after a track was
    /// loaded but failed to start.
    staged: Option<PathBuf>,
    playing: bool,
    position: Duration,
    progress: f32,
    volume: f32,
    generation: u64,
    transport: SharedTransport,
}

impl<E: PlaybackEngine> PlayerController<E> {
    pub fn new(engine: E, volume: f32) -> Self {
        Self::with_duration_reader(engine, volume, metadata::read_duration)
    }

    pub fn with_duration_reader(
        mut engine: E,
        volume: f32,
        read_duration: fn(&Path) -> Duration,
    ) -> Self {
        let volume = to_level(volume);
        engine.set_volume(volume);
        let probe = engine.probe();

        Self {
            engine,
            probe,
            read_duration,
            current: None,
            staged: None,
            playing: false,
            position: Duration::ZERO,
            progress: 0.0,
            volume,
            generation: 0,
            transport: Arc::new(Mutex::new(Transport::default())),
        }
    }

    pub fn state(&self) -> PlayerState {
        match (&self.current, self.playing) {
            (None, _) => PlayerState::Idle,
            (Some(_), false) => PlayerState::Paused,
            (Some(_), true) => PlayerState::Playing,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref().map(|current| &current.track)
    }

    pub fn is_current(&self, track: &Track) -> bool {
        self.current_track().is_some_and(|current| current.path == track.path)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration(&self) -> Duration {
        self.current
            .as_ref()
            .map_or(Duration::ZERO, |current| current.duration)
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    /// Last published progress, 0-100.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Volume on the engine's 0.0-1.0 scale.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn transport(&self) -> SharedTransport {
        Arc::clone(&self.transport)
    }

    pub fn probe(&self) -> Arc<dyn EngineProbe> {
        Arc::clone(&self.probe)
    }

    /// `"name - MM:SS"` for the current track.
    pub fn status_line(&self) -> String {
        match &self.current {
            Some(current) => format!(
                "{} - {}",
                current.track.name,
                metadata::format_time(current.duration.as_secs())
            ),
            None => "No file selected".to_string(),
        }
    }

    /// Make `track` current without starting it. Re-selecting the current
    /// track does nothing.
    pub fn select(&mut self, track: &Track) -> Result<(), AppError> {
        if self.is_current(track) {
            return Ok(());
        }

        self.halt();
        let duration = self.stage(track)?;
        self.commit(track, duration);
        Ok(())
    }

    /// Row control: start a different track, or pause/resume the current one.
    pub fn toggle(&mut self, track: &Track) -> Result<(), AppError> {
        if !self.is_current(track) {
            self.halt();
            let duration = self.stage(track)?;
            self.engine
                .play(None)
                .map_err(|source| playback_failure(track, source))?;

            self.commit(track, duration);
            self.set_playing(true);
            return Ok(());
        }

        if self.playing {
            if let Some(status) = self.probe.status() {
                self.position = status.elapsed;
            }
            self.engine.pause();
            self.set_playing(false);
        } else {
            self.restage_current()?;
            let resumed = self
                .engine
                .resume()
                .map_err(|source| playback_failure(track, source))?;
            if resumed == Resumed::Restarted {
                self.position = Duration::ZERO;
                self.progress = 0.0;
            }
            self.set_playing(true);
        }

        Ok(())
    }

    /// Jump to `percent` (0-100) of the current track. The engine cannot
    /// reposition without playing, so a paused track resumes here.
    pub fn seek(&mut self, percent: f32) -> Result<(), AppError> {
        let Some(current) = &self.current else {
            return Ok(());
        };
        if current.duration.is_zero() {
            debug!(track = %current.track.name, "seek ignored, duration unknown");
            return Ok(());
        }

        let percent = percent.clamp(0.0, 100.0);
        let offset = seek_offset(current.duration, percent);
        let track = current.track.clone();

        self.restage_current()?;
        self.engine
            .play(Some(offset))
            .map_err(|source| playback_failure(&track, source))?;

        self.position = offset;
        self.progress = percent;
        self.set_playing(true);
        Ok(())
    }

    /// `level` is 0-100. Leaves the transport state alone.
    pub fn set_volume(&mut self, level: f32) {
        self.volume = to_level(level);
        self.engine.set_volume(self.volume);
    }

    /// Halt playback but keep the current track selected.
    pub fn stop(&mut self) {
        if self.current.is_none() {
            return;
        }
        if self.playing {
            if let Some(status) = self.probe.status() {
                self.position = status.elapsed;
            }
        }
        self.engine.stop();
        self.set_playing(false);
    }

    pub fn handle_progress(&mut self, event: ProgressEvent) {
        if event.generation() != self.generation {
            trace!(?event, current = self.generation, "dropping stale progress");
            return;
        }

        match event {
            ProgressEvent::Tick {
                update: ProgressUpdate { position, percent },
                ..
            } => {
                if self.playing {
                    self.position = position;
                    self.progress = percent;
                }
            }
            ProgressEvent::Finished { .. } => {
                if self.playing {
                    self.position = self.duration();
                    self.progress = 100.0;
                    self.set_playing(false);
                }
            }
        }
    }

    /// Silence the engine before another file replaces the current one.
    fn halt(&mut self) {
        self.engine.stop();
        if self.playing {
            self.set_playing(false);
        }
    }

    /// Hand `track` to the engine. Nothing the UI sees changes yet.
    fn stage(&mut self, track: &Track) -> Result<Duration, AppError> {
        self.engine
            .load(track.path())
            .map_err(|source| playback_failure(track, source))?;
        self.staged = Some(track.path.clone());

        Ok((self.read_duration)(track.path()))
    }

    fn commit(&mut self, track: &Track, duration: Duration) {
        info!(
            track = %track.name,
            duration_secs = duration.as_secs(),
            "loaded track"
        );

        self.current = Some(Current {
            track: track.clone(),
            duration,
        });
        self.position = Duration::ZERO;
        self.progress = 0.0;
        self.publish();
    }

    /// Put the current track back into the engine if a failed switch left
    /// another file staged there.
    fn restage_current(&mut self) -> Result<(), AppError> {
        let Some(current) = &self.current else {
            return Ok(());
        };
        if self.staged.as_deref() == Some(current.track.path()) {
            return Ok(());
        }

        let track = current.track.clone();
        self.engine
            .load(track.path())
            .map_err(|source| playback_failure(&track, source))?;
        self.staged = Some(track.path);
        Ok(())
    }

    fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        self.publish();
    }

    fn publish(&mut self) {
        self.generation += 1;

        let mut transport = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *transport = Transport {
            playing: self.playing,
            duration: self.duration(),
            generation: self.generation,
        };
    }
}

fn to_level(percent: f32) -> f32 {
    percent.clamp(0.0, 100.0) / 100.0
}

fn seek_offset(duration: Duration, percent: f32) -> Duration {
    Duration::from_secs_f64(duration.as_secs_f64() * f64::from(percent) / 100.0)
}

fn playback_failure(track: &Track, source: EngineError) -> AppError {
    AppError::PlaybackFailure {
        path: track.path.clone(),
        source,
    }
}
