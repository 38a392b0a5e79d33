use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

use crate::audio::engine::{EngineError, EngineProbe, EngineStatus, PlaybackEngine, Resumed};

/// The sink currently attached to the output stream, plus the offset it was
/// started at. `Sink::get_pos` counts from the moment the source was
/// appended, so the offset is added back to get the position in the file.
#[derive(Default)]
struct SinkSlot {
    sink: Option<Sink>,
    offset: Duration,
}

/// rodio-backed engine. Owns the default output stream for the life of the
/// process; every `play` builds a fresh sink on it.
pub struct RodioEngine {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    slot: Arc<Mutex<SinkSlot>>,
    loaded: Option<PathBuf>,
    volume: f32,
}

impl RodioEngine {
    pub fn new() -> Result<Self, EngineError> {
        let (stream, stream_handle) = OutputStream::try_default()?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            slot: Arc::new(Mutex::new(SinkSlot::default())),
            loaded: None,
            volume: 1.0,
        })
    }

    fn slot(&self) -> MutexGuard<'_, SinkSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, EngineError> {
    let file = File::open(path)?;
    Ok(Decoder::new(BufReader::new(file))?)
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        decode(path)?;

        self.stop();
        self.loaded = Some(path.to_path_buf());
        debug!(path = %path.display(), "staged for playback");
        Ok(())
    }

    fn play(&mut self, start: Option<Duration>) -> Result<(), EngineError> {
        let path = self.loaded.as_deref().ok_or(EngineError::NothingLoaded)?;
        let start = start.unwrap_or(Duration::ZERO);

        // `skip_duration` is the seeking primitive; it works for every format
        // the decoder can open, seekable or not.
        let source = decode(path)?.skip_duration(start);
        let sink = Sink::try_new(&self.stream_handle)?;
        sink.set_volume(self.volume);
        sink.append(source);

        let mut slot = self.slot();
        if let Some(previous) = slot.sink.take() {
            previous.stop();
        }
        slot.sink = Some(sink);
        slot.offset = start;

        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.slot().sink {
            sink.pause();
        }
    }

    fn resume(&mut self) -> Result<Resumed, EngineError> {
        {
            let slot = self.slot();
            if let Some(sink) = slot.sink.as_ref().filter(|sink| !sink.empty()) {
                sink.play();
                return Ok(Resumed::Continued);
            }
        }

        self.play(None)?;
        Ok(Resumed::Restarted)
    }

    fn stop(&mut self) {
        let mut slot = self.slot();
        if let Some(sink) = slot.sink.take() {
            sink.stop();
        }
        slot.offset = Duration::ZERO;
    }

    fn set_volume(&mut self, level: f32) {
        self.volume = level;
        if let Some(sink) = &self.slot().sink {
            sink.set_volume(level);
        }
    }

    fn probe(&self) -> Arc<dyn EngineProbe> {
        Arc::new(RodioProbe {
            slot: Arc::clone(&self.slot),
        })
    }
}

struct RodioProbe {
    slot: Arc<Mutex<SinkSlot>>,
}

impl EngineProbe for RodioProbe {
    fn status(&self) -> Option<EngineStatus> {
        let slot = self.slot.lock().ok()?;

        let status = match &slot.sink {
            Some(sink) => EngineStatus {
                busy: !sink.empty() && !sink.is_paused(),
                elapsed: slot.offset + sink.get_pos(),
            },
            None => EngineStatus {
                busy: false,
                elapsed: slot.offset,
            },
        };

        Some(status)
    }
}
