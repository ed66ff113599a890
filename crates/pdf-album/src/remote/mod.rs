//! Remote file store seam.
//!
//! The core only needs four capabilities from wherever the story files
//! live: list a folder, fetch bytes, upload a new file and overwrite an
//! existing one. Authentication and retries belong to the implementor.

mod local;
mod memory;

pub use local::LocalFolderStore;
pub use memory::MemoryStore;

use crate::types::{FileId, FolderHandle, RemoteFile};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Blocking access to a folder-based file store.
///
/// Listing order is unspecified; callers must not rely on it.
pub trait RemoteStore: Send + Sync {
    /// List the files directly inside `folder`
    fn list_files(&self, folder: &FolderHandle) -> RemoteResult<Vec<RemoteFile>>;

    /// Fetch the raw bytes of a file
    fn fetch(&self, id: &FileId) -> RemoteResult<Vec<u8>>;

    /// Create a new file named `name` in `folder`
    fn upload(
        &self,
        folder: &FolderHandle,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> RemoteResult<RemoteFile>;

    /// Replace the bytes of an existing file
    fn update(&self, id: &FileId, bytes: Vec<u8>) -> RemoteResult<()>;
}
