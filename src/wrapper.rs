//! Named file-like container used for pasteboard transport and on-disk storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A regular file's contents plus the name it prefers to be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrapper {
    pub preferred_filename: String,
    pub contents: Vec<u8>,
}

impl FileWrapper {
    pub fn new(preferred_filename: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            preferred_filename: preferred_filename.into(),
            contents,
        }
    }

    /// Write the contents to `dir/<preferred_filename>` and return the path.
    ///
    /// Refuses names that would escape `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let name = Path::new(&self.preferred_filename);
        if self.preferred_filename.is_empty()
            || name.components().count() != 1
            || name.file_name().is_none()
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file name \"{}\"", self.preferred_filename),
            )
            .into());
        }
        let path = dir.join(name);
        fs::write(&path, &self.contents)?;
        tracing::debug!(
            path = %path.display(),
            bytes = self.contents.len(),
            "wrote attachment file"
        );
        Ok(path)
    }

    /// Read a file back, taking its file name as the preferred name.
    pub fn read_from_path(path: &Path) -> Result<FileWrapper> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("path has no UTF-8 file name: {}", path.display()),
                )
            })?
            .to_string();
        let contents = fs::read(path)?;
        Ok(FileWrapper::new(name, contents))
    }
}
