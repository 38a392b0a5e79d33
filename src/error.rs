use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::audio::engine::EngineError;

/// Failures of user-triggered actions. Each one ends up in a notification
/// dialog; none of them is retried.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Audio directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Could not read directory {}: {source}", path.display())]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error playing {}: {source}", path.display())]
    PlaybackFailure {
        path: PathBuf,
        #[source]
        source: EngineError,
    },

    #[error("Error downloading {}: {source}", path.display())]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
