//! In-memory store, used by tests and as a scratch backend

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::types::{FileId, FolderHandle, RemoteFile};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredFile {
    folder: FolderHandle,
    name: String,
    mime_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<FileId, StoredFile>,
    /// Insertion order of ids, oldest first
    sequence: Vec<FileId>,
    next_id: u64,
    offline: bool,
}

/// A [`RemoteStore`] held entirely in memory.
///
/// Ids are assigned as `mem-1`, `mem-2`, ... and listings come back newest
/// first, so nothing that depends on listing order goes unnoticed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means another test thread panicked mid-call
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a file, bypassing the offline switch
    pub fn add_file(&self, folder: &FolderHandle, name: &str, bytes: Vec<u8>) -> FileId {
        let mut state = self.lock();
        insert_file(&mut state, folder, name, None, bytes).id
    }

    /// Make every trait call fail with [`RemoteError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Current bytes of a file, if it exists
    pub fn file_bytes(&self, id: &FileId) -> Option<Vec<u8>> {
        self.lock().files.get(id).map(|f| f.bytes.clone())
    }

    /// Names of the files in a folder, in insertion order
    pub fn file_names(&self, folder: &FolderHandle) -> Vec<String> {
        let state = self.lock();
        state
            .sequence
            .iter()
            .filter_map(|id| state.files.get(id))
            .filter(|f| &f.folder == folder)
            .map(|f| f.name.clone())
            .collect()
    }

    /// Find a file by name in a folder
    pub fn find(&self, folder: &FolderHandle, name: &str) -> Option<FileId> {
        let state = self.lock();
        state
            .sequence
            .iter()
            .find(|id| {
                state
                    .files
                    .get(*id)
                    .is_some_and(|f| &f.folder == folder && f.name == name)
            })
            .cloned()
    }
}

fn insert_file(
    state: &mut MemoryState,
    folder: &FolderHandle,
    name: &str,
    mime_type: Option<&str>,
    bytes: Vec<u8>,
) -> RemoteFile {
    state.next_id += 1;
    let id = FileId(format!("mem-{}", state.next_id));
    state.files.insert(
        id.clone(),
        StoredFile {
            folder: folder.clone(),
            name: name.to_string(),
            mime_type: mime_type.map(str::to_string),
            bytes,
        },
    );
    state.sequence.push(id.clone());

    RemoteFile {
        id,
        name: name.to_string(),
        mime_type: mime_type.map(str::to_string),
        thumbnail: None,
    }
}

fn ensure_online(state: &MemoryState) -> RemoteResult<()> {
    if state.offline {
        Err(RemoteError::Unavailable("memory store is offline".to_string()))
    } else {
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn list_files(&self, folder: &FolderHandle) -> RemoteResult<Vec<RemoteFile>> {
        let state = self.lock();
        ensure_online(&state)?;

        Ok(state
            .sequence
            .iter()
            .rev()
            .filter_map(|id| state.files.get(id).map(|f| (id, f)))
            .filter(|(_, f)| &f.folder == folder)
            .map(|(id, f)| RemoteFile {
                id: id.clone(),
                name: f.name.clone(),
                mime_type: f.mime_type.clone(),
                thumbnail: None,
            })
            .collect())
    }

    fn fetch(&self, id: &FileId) -> RemoteResult<Vec<u8>> {
        let state = self.lock();
        ensure_online(&state)?;

        state
            .files
            .get(id)
            .map(|f| f.bytes.clone())
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }

    fn upload(
        &self,
        folder: &FolderHandle,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> RemoteResult<RemoteFile> {
        let mut state = self.lock();
        ensure_online(&state)?;
        Ok(insert_file(&mut state, folder, name, Some(mime_type), bytes))
    }

    fn update(&self, id: &FileId, bytes: Vec<u8>) -> RemoteResult<()> {
        let mut state = self.lock();
        ensure_online(&state)?;

        let file = state
            .files
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        file.bytes = bytes;
        Ok(())
    }
}
