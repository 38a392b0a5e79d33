use std::fs::{self, File, FileTimes, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::AppError;

/// Copy `source` into `dest_dir` under the same file name, creating the
/// directory when needed. Returns the path of the copy.
///
/// The source is checked first so that a missing file never leaves an empty
/// destination directory behind.
pub fn export_file(source: &Path, dest_dir: &Path) -> Result<PathBuf, AppError> {
    copy_preserving_times(source, dest_dir).map_err(|source_err| AppError::ExportFailed {
        path: source.to_path_buf(),
        source: source_err,
    })
}

fn copy_preserving_times(source: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let metadata = fs::metadata(source)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "source is not a regular file",
        ));
    }
    let file_name = source
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"))?;

    fs::create_dir_all(dest_dir)?;
    let target = dest_dir.join(file_name);
    fs::copy(source, &target)?;

    carry_over_times(&metadata, &target);

    info!(source = %source.display(), target = %target.display(), "exported file");
    Ok(target)
}

/// Best effort. The copy already exists by now, so a missing timestamp or a
/// target that refuses `set_times` only gets logged.
fn carry_over_times(metadata: &Metadata, target: &Path) {
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    let applied = File::options()
        .write(true)
        .open(target)
        .and_then(|file| file.set_times(times));
    if let Err(err) = applied {
        debug!(target = %target.display(), %err, "could not carry over file times");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    #[test]
    fn creates_destination_and_copies_bytes() {
        let src_dir = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = src_dir.path().join("a.mp3");
        fs::write(&source, b"\x00\x01ID3 payload bytes").unwrap();
        let dest = out.path().join("downloads");

        let copied = export_file(&source, &dest).unwrap();

        assert_eq!(copied, dest.join("a.mp3"));
        assert_eq!(fs::read(&copied).unwrap(), fs::read(&source).unwrap());
    }

    #[test]
    fn keeps_modification_time() {
        let src_dir = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = src_dir.path().join("old.wav");
        fs::write(&source, b"riff").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let copied = export_file(&source, out.path()).unwrap();
        assert_eq!(fs::metadata(copied).unwrap().modified().unwrap(), old);
    }

    #[test]
    fn missing_source_fails_and_leaves_destination_alone() {
        let src_dir = tempdir().unwrap();
        let out = tempdir().unwrap();
        let dest = out.path().join("downloads");

        let err = export_file(&src_dir.path().join("gone.ogg"), &dest).unwrap_err();

        assert!(matches!(err, AppError::ExportFailed { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn overwrites_an_existing_copy() {
        let src_dir = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = src_dir.path().join("b.wav");
        fs::write(&source, b"new").unwrap();
        fs::write(out.path().join("b.wav"), b"stale contents").unwrap();

        export_file(&source, out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("b.wav")).unwrap(), b"new");
    }

    #[test]
    fn timestamp_carry_over_never_fails_the_export() {
        let src_dir = tempdir().unwrap();
        let source = src_dir.path().join("a.mp3");
        fs::write(&source, b"bytes").unwrap();
        let metadata = fs::metadata(&source).unwrap();

        // A target that cannot be opened for writing is skipped quietly.
        carry_over_times(&metadata, &src_dir.path().join("vanished").join("a.mp3"));
        carry_over_times(&metadata, src_dir.path());

        assert_eq!(fs::read(&source).unwrap(), b"bytes");
    }
}
