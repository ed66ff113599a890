use crate::remote::RemoteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlbumError {
    #[error("Remote access error: {0}")]
    RemoteAccess(#[from] RemoteError),
    #[error("Could not decode {filename}: {reason}")]
    Decode { filename: String, reason: String },
    #[error("{filename} is a {kind} unit, which this operation does not accept")]
    UnsupportedKind { filename: String, kind: ContentKind },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AlbumError {
    pub(crate) fn decode(filename: impl Into<String>, reason: impl fmt::Display) -> Self {
        AlbumError::Decode {
            filename: filename.into(),
            reason: reason.to_string(),
        }
    }

    /// Per-unit payload failures that assembly skips instead of aborting on
    pub fn is_unit_local(&self) -> bool {
        matches!(
            self,
            AlbumError::Decode { .. } | AlbumError::UnsupportedKind { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AlbumError>;

/// Opaque handle of a file on the remote store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub String);

impl FileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        FileId(s.to_string())
    }
}

/// Opaque handle of a folder on the remote store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderHandle(pub String);

impl FolderHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FolderHandle {
    fn from(s: &str) -> Self {
        FolderHandle(s.to_string())
    }
}

/// What a content unit holds, derived from its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Text,
    Pdf,
    Unknown,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentKind::Image => "image",
            ContentKind::Text => "text",
            ContentKind::Pdf => "pdf",
            ContentKind::Unknown => "unknown",
        };
        f.pad(s)
    }
}

/// One story element tracked in a folder.
///
/// Identity is the remote `id`; `filename` is unique within a folder's
/// working list and is what the order record stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUnit {
    pub filename: String,
    pub id: FileId,
    pub kind: ContentKind,
    pub thumbnail: Option<String>,
    pub text_content: Option<String>,
}

impl ContentUnit {
    pub fn new(filename: impl Into<String>, id: FileId, kind: ContentKind) -> Self {
        Self {
            filename: filename.into(),
            id,
            kind,
            thumbnail: None,
            text_content: None,
        }
    }
}

/// File metadata as reported by the remote store
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub id: FileId,
    pub name: String,
    pub mime_type: Option<String>,
    pub thumbnail: Option<String>,
}

/// One finished output PDF
#[derive(Debug, Clone)]
pub struct Album {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Ids of the units whose pages ended up in this album, in order
    pub sources: Vec<FileId>,
}

impl Album {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A unit left out of the albums because it could not be rendered
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedUnit {
    pub filename: String,
    pub reason: String,
}

/// A page that exceeds the size limit on its own and was placed alone
#[derive(Debug, Clone, PartialEq)]
pub struct OversizedPage {
    pub filename: String,
    pub album_index: usize,
    pub bytes: usize,
}

/// Result of an assembly run
#[derive(Debug, Clone, Default)]
pub struct AlbumSet {
    pub albums: Vec<Album>,
    pub skipped: Vec<SkippedUnit>,
    pub oversized: Vec<OversizedPage>,
}

impl AlbumSet {
    pub fn total_pages(&self) -> usize {
        self.albums.iter().map(|a| a.page_count).sum()
    }

    pub fn into_buffers(self) -> Vec<Vec<u8>> {
        self.albums.into_iter().map(|a| a.bytes).collect()
    }
}
