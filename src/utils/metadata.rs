//! Best-effort track duration lookup.
//!
//! Two readers are tried in order: the container header via symphonia, then
//! the tag/properties reader from lofty, which knows more formats but is
//! slower. If neither can say, the duration is zero.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
enum MetadataError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Probe(#[from] symphonia::core::errors::Error),

    #[error(transparent)]
    Properties(#[from] lofty::error::LoftyError),

    #[error("duration not reported")]
    Unknown,
}

type DurationStrategy = fn(&Path) -> Result<Duration, MetadataError>;

const STRATEGIES: [(&str, DurationStrategy); 2] =
    [("symphonia", probe_duration), ("lofty", properties_duration)];

/// Total duration of the file at `path`, or zero when it cannot be read.
pub fn read_duration(path: &Path) -> Duration {
    for (name, strategy) in STRATEGIES {
        match strategy(path) {
            Ok(duration) => return duration,
            Err(err) => {
                debug!(path = %path.display(), reader = name, %err, "duration lookup failed");
            }
        }
    }

    Duration::ZERO
}

fn probe_duration(path: &Path) -> Result<Duration, MetadataError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension() {
        hint.with_extension(&extension.to_string_lossy());
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .default_track()
        .ok_or(MetadataError::Unknown)?;

    match (track.codec_params.n_frames, track.codec_params.sample_rate) {
        (Some(n_frames), Some(sample_rate)) if sample_rate > 0 => Ok(Duration::from_secs_f64(
            n_frames as f64 / f64::from(sample_rate),
        )),
        _ => Err(MetadataError::Unknown),
    }
}

fn properties_duration(path: &Path) -> Result<Duration, MetadataError> {
    let tagged = lofty::read_from_path(path)?;
    let duration = tagged.properties().duration();

    if duration.is_zero() {
        return Err(MetadataError::Unknown);
    }
    Ok(duration)
}

/// `MM:SS`, both fields zero padded. Minutes keep counting past an hour.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
