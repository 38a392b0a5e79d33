use std::path::{Path, PathBuf};

/// An audio file exposed in the directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub name: String,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
