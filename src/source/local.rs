//! Local filesystem content source.

use super::{validate_name, FileEntry};
use crate::errors::{PortalError, PortalResult};
use std::path::PathBuf;

/// Content source backed by a directory on disk.
///
/// Listing order is whatever `read_dir` yields; no sorting is applied.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    /// Create a source over the given directory. Existence is checked per
    /// call, not here, so a directory created later is picked up.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured root directory.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// List supported files in directory order.
    ///
    /// A missing root is a configuration error; an existing but empty (or
    /// unmatching) directory is an empty listing.
    pub fn list_files(&self) -> PortalResult<Vec<FileEntry>> {
        if !self.root.is_dir() {
            return Err(PortalError::configuration(format!(
                "Content directory does not exist: {}",
                self.root.display()
            )));
        }

        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            PortalError::configuration(format!(
                "Cannot read content directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Some(file) = FileEntry::from_name(name) {
                    files.push(file);
                }
            }
        }

        tracing::debug!(root = %self.root.display(), count = files.len(), "Listed local files");
        Ok(files)
    }

    /// Read a listed file. A name that vanished between listing and fetch is
    /// NotFound, never wrong content.
    pub fn fetch(&self, name: &str) -> PortalResult<Vec<u8>> {
        validate_name(name)?;

        let path = self.root.join(name);
        if !path.is_file() {
            return Err(PortalError::not_found(name));
        }

        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PortalError::not_found(name),
            _ => PortalError::configuration(format!("Cannot read {}: {}", path.display(), e)),
        })
    }
}
