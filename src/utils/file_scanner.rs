use std::path::Path;

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::AppError;
use crate::track::Track;

const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

pub struct AudioFileScanner;

impl AudioFileScanner {
    /// List the audio files directly inside `dir`, in the order the
    /// filesystem hands them out. Subdirectories are not entered.
    pub fn scan_directory(dir: &Path) -> Result<Vec<Track>, AppError> {
        if !dir.is_dir() {
            return Err(AppError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut tracks = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(AppError::ScanFailed {
                        path: dir.to_path_buf(),
                        source: err.into(),
                    });
                }
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            if path.is_file() && Self::is_audio_file(path) {
                tracks.push(Track::new(path));
            }
        }

        info!(dir = %dir.display(), count = tracks.len(), "scanned audio directory");
        Ok(tracks)
    }

    fn is_audio_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                AUDIO_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn is_audio_file_matches_known_extensions_case_insensitive() {
        assert!(AudioFileScanner::is_audio_file(Path::new("/tmp/a.mp3")));
        assert!(AudioFileScanner::is_audio_file(Path::new("/tmp/a.WAV")));
        assert!(AudioFileScanner::is_audio_file(Path::new("/tmp/a.ogg")));
        assert!(!AudioFileScanner::is_audio_file(Path::new("/tmp/a.flac")));
        assert!(!AudioFileScanner::is_audio_file(Path::new("/tmp/a.txt")));
        assert!(!AudioFileScanner::is_audio_file(Path::new("/tmp/mp3")));
    }

    #[test]
    fn scan_returns_recognized_subset_in_enumeration_order() {
        let dir = tempdir().unwrap();
        for name in ["b.wav", "notes.txt", "a.mp3", "cover.jpg", "c.ogg"] {
            fs::write(dir.path().join(name), b"not real audio").unwrap();
        }

        let tracks = AudioFileScanner::scan_directory(dir.path()).unwrap();

        let expected: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| !name.ends_with(".txt") && !name.ends_with(".jpg"))
            .collect();
        assert_eq!(names(&tracks), expected);
        assert_eq!(tracks.len(), 3);
    }

    #[test]
    fn scan_does_not_recurse() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("nested.mp3");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let tracks = AudioFileScanner::scan_directory(dir.path()).unwrap();
        assert_eq!(names(&tracks), vec!["root.mp3"]);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("audios");

        let err = AudioFileScanner::scan_directory(&missing).unwrap_err();
        assert!(matches!(err, AppError::DirectoryNotFound(p) if p == missing));
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.mp3");
        fs::write(&file, b"not real").unwrap();

        let err = AudioFileScanner::scan_directory(&file).unwrap_err();
        assert!(matches!(err, AppError::DirectoryNotFound(_)));
    }
}
