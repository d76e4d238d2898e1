//! Content source adapter.
//!
//! Two interchangeable backing stores expose the same contract: list the
//! course files whose extension is one of {pdf, pptx, docx}, and fetch raw
//! bytes for a listed name. The `Local` variant walks a configured directory;
//! the `Github` variant talks to a repository hosting API. Which variant runs
//! is decided once, from configuration, at startup.
//!
//! Every call is a fresh, independent fetch: no retries, no caching, no
//! integrity checks.

mod github;
mod local;

pub use github::GithubSource;
pub use local::LocalSource;

use crate::errors::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};

/// The three supported document kinds. Files with any other extension are
/// never listed or selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Pptx,
    Docx,
}

impl FileKind {
    /// Classify a file name by extension, case-insensitively.
    /// Returns None for unsupported extensions.
    pub fn from_name(name: &str) -> Option<FileKind> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "pptx" => Some(FileKind::Pptx),
            "docx" => Some(FileKind::Docx),
            _ => None,
        }
    }

    /// Lowercase extension without the dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Pptx => "pptx",
            FileKind::Docx => "docx",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One listable course file. Derived transiently from a listing and
/// recomputed on every view of the content page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name as the source reports it, extension included.
    pub name: String,
    /// Classified kind, derived from the name.
    pub kind: FileKind,
}

impl FileEntry {
    /// Build an entry if the name carries a supported extension.
    pub fn from_name(name: impl Into<String>) -> Option<FileEntry> {
        let name = name.into();
        FileKind::from_name(&name).map(|kind| FileEntry { name, kind })
    }
}

/// Reject names that could escape the configured location or that were never
/// listable in the first place. Both sources apply this before fetching.
pub(crate) fn validate_name(name: &str) -> PortalResult<FileKind> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(PortalError::not_found(name));
    }
    FileKind::from_name(name).ok_or_else(|| PortalError::not_found(name))
}

/// The configured backing store, one of two variants behind one contract.
pub enum ContentSource {
    /// A directory on the local filesystem.
    Local(LocalSource),
    /// A remote repository reached over its hosting API.
    Github(GithubSource),
}

impl ContentSource {
    /// Enumerate supported files in the order the underlying source yields
    /// them. Empty is a normal outcome, not an error.
    pub async fn list_files(&self) -> PortalResult<Vec<FileEntry>> {
        match self {
            ContentSource::Local(source) => source.list_files(),
            ContentSource::Github(source) => source.list_files().await,
        }
    }

    /// Fetch raw bytes for a previously listed name.
    pub async fn fetch(&self, name: &str) -> PortalResult<Vec<u8>> {
        match self {
            ContentSource::Local(source) => source.fetch(name),
            ContentSource::Github(source) => source.fetch(name).await,
        }
    }

    /// Short tag for logs and the health endpoint.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSource::Local(_) => "local",
            ContentSource::Github(_) => "github",
        }
    }

    /// Whether this source defaults to DOCX preview being available.
    /// The local deployment previews DOCX; the remote one does not, unless
    /// configuration says otherwise.
    pub fn default_docx_preview(&self) -> bool {
        matches!(self, ContentSource::Local(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_case_insensitive() {
        assert_eq!(FileKind::from_name("a.pdf"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_name("a.PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_name("slides.PpTx"), Some(FileKind::Pptx));
        assert_eq!(FileKind::from_name("notes.DOCX"), Some(FileKind::Docx));
    }

    #[test]
    fn test_file_kind_rejects_everything_else() {
        for name in ["a.txt", "a.pdf.bak", "archive.zip", "pdf", "a.", "noext", ".pdf.md"] {
            assert_eq!(FileKind::from_name(name), None, "{name} should be rejected");
        }
    }

    #[test]
    fn test_entry_from_name() {
        let entry = FileEntry::from_name("Week 1 - Intro.PDF").unwrap();
        assert_eq!(entry.name, "Week 1 - Intro.PDF");
        assert_eq!(entry.kind, FileKind::Pdf);
        assert!(FileEntry::from_name("readme.md").is_none());
    }

    #[test]
    fn test_validate_name_blocks_traversal() {
        assert!(validate_name("../secret.pdf").is_err());
        assert!(validate_name("sub/dir.pdf").is_err());
        assert!(validate_name("sub\\dir.pdf").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("notes.txt").is_err());
        assert_eq!(validate_name("notes.docx").unwrap(), FileKind::Docx);
    }
}
