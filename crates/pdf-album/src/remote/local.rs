//! Directory-backed store.
//!
//! A folder handle is a directory path relative to the root; a file id is
//! the file's path relative to the root, with `/` separators.

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::types::{FileId, FolderHandle, RemoteFile};
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalFolderStore {
    root: PathBuf,
}

impl LocalFolderStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a relative handle against the root, refusing to escape it
    fn resolve(&self, relative: &str) -> RemoteResult<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(RemoteError::NotFound(format!(
                "{} is outside the store root",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }

    fn file_id(folder: &FolderHandle, name: &str) -> FileId {
        let folder = folder.as_str().trim_matches('/');
        if folder.is_empty() || folder == "." {
            FileId(name.to_string())
        } else {
            FileId(format!("{}/{}", folder, name))
        }
    }
}

fn not_found_or_io(err: std::io::Error, what: &str) -> RemoteError {
    if err.kind() == std::io::ErrorKind::NotFound {
        RemoteError::NotFound(what.to_string())
    } else {
        RemoteError::Io(err)
    }
}

impl RemoteStore for LocalFolderStore {
    fn list_files(&self, folder: &FolderHandle) -> RemoteResult<Vec<RemoteFile>> {
        let dir = self.resolve(folder.as_str())?;
        let entries = fs::read_dir(&dir).map_err(|e| not_found_or_io(e, folder.as_str()))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                log::warn!("Skipping non UTF-8 file name in {}", dir.display());
                continue;
            };
            files.push(RemoteFile {
                id: Self::file_id(folder, &name),
                name,
                mime_type: None,
                thumbnail: None,
            });
        }
        Ok(files)
    }

    fn fetch(&self, id: &FileId) -> RemoteResult<Vec<u8>> {
        let path = self.resolve(id.as_str())?;
        fs::read(&path).map_err(|e| not_found_or_io(e, id.as_str()))
    }

    fn upload(
        &self,
        folder: &FolderHandle,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> RemoteResult<RemoteFile> {
        if name.contains('/') || name.contains('\\') {
            return Err(RemoteError::Unavailable(format!(
                "file name {} contains a path separator",
                name
            )));
        }

        let id = Self::file_id(folder, name);
        let path = self.resolve(id.as_str())?;
        if path.exists() {
            log::debug!("Overwriting existing file {}", path.display());
        }
        fs::write(&path, bytes)?;

        Ok(RemoteFile {
            id,
            name: name.to_string(),
            mime_type: Some(mime_type.to_string()),
            thumbnail: None,
        })
    }

    fn update(&self, id: &FileId, bytes: Vec<u8>) -> RemoteResult<()> {
        let path = self.resolve(id.as_str())?;
        if !path.is_file() {
            return Err(RemoteError::NotFound(id.to_string()));
        }
        fs::write(&path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_ids_are_relative_to_root() {
        assert_eq!(
            LocalFolderStore::file_id(&FolderHandle::from("trip"), "a.jpg"),
            FileId::from("trip/a.jpg")
        );
        assert_eq!(
            LocalFolderStore::file_id(&FolderHandle::from("."), "a.jpg"),
            FileId::from("a.jpg")
        );
    }

    #[test]
    fn handles_cannot_escape_root() {
        let store = LocalFolderStore::new("/tmp/albums");
        assert!(store.resolve("../etc").is_err());
        assert!(store.resolve("/etc").is_err());
        assert!(store.resolve("trip/day1").is_ok());
    }
}
