//! Durable story order.
//!
//! Each folder carries one hidden JSON record, `{"order": [filename, ...]}`,
//! that is the only source of truth for the user-chosen sequence. Writes are
//! last-write-wins: two sessions editing the same folder overwrite each
//! other's order.

use crate::constants::MIME_JSON;
use crate::remote::RemoteStore;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Reserved name of the order record inside a folder
pub const ORDER_RECORD_NAME: &str = ".storyproject.json";

/// On-disk schema of the order record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default)]
    pub order: Vec<String>,
}

impl OrderRecord {
    pub fn from_units(units: &[ContentUnit]) -> Self {
        Self {
            order: units.iter().map(|u| u.filename.clone()).collect(),
        }
    }
}

/// Case-insensitive filename ordering used for files the record does not name.
///
/// Ties between names that differ only in case fall back to the raw name so
/// the result never depends on listing order. Numeric prefixes such as
/// `010_` order correctly as long as they are zero-padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    folded: String,
    raw: String,
}

impl SortKey {
    pub fn for_name(name: &str) -> Self {
        Self {
            folded: name.to_lowercase(),
            raw: name.to_string(),
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded
            .cmp(&other.folded)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Load the saved order of a folder.
///
/// Returns `None` when there is no record or it cannot be read; a missing
/// order is the normal first-run state, so nothing is raised.
pub fn load_order(store: &dyn RemoteStore, folder: &FolderHandle) -> Option<Vec<String>> {
    match store.list_files(folder) {
        Ok(files) => load_order_from_listing(store, &files),
        Err(e) => {
            log::warn!("Could not list {} to find its order record: {}", folder, e);
            None
        }
    }
}

/// Load the order record out of an existing listing
pub(crate) fn load_order_from_listing(
    store: &dyn RemoteStore,
    files: &[RemoteFile],
) -> Option<Vec<String>> {
    let record = files.iter().find(|f| f.name == ORDER_RECORD_NAME)?;

    let bytes = match store.fetch(&record.id) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Could not fetch order record {}: {}", record.id, e);
            return None;
        }
    };

    match serde_json::from_slice::<OrderRecord>(&bytes) {
        Ok(record) => Some(record.order),
        Err(e) => {
            log::warn!("Ignoring unreadable order record {}: {}", record.id, e);
            None
        }
    }
}

/// Persist the sequence of `units` as the folder's order record.
///
/// Only filenames are stored. The existing record is overwritten if one is
/// found by name, otherwise a new one is created.
pub fn persist_order(
    store: &dyn RemoteStore,
    folder: &FolderHandle,
    units: &[ContentUnit],
) -> Result<()> {
    let record = OrderRecord::from_units(units);
    let bytes = serde_json::to_vec_pretty(&record)?;

    let existing = store
        .list_files(folder)?
        .into_iter()
        .find(|f| f.name == ORDER_RECORD_NAME);

    match existing {
        Some(file) => store.update(&file.id, bytes)?,
        None => {
            store.upload(folder, ORDER_RECORD_NAME, MIME_JSON, bytes)?;
        }
    }

    log::debug!("Saved order of {} units in {}", record.order.len(), folder);
    Ok(())
}

/// Merge a saved order with the files actually present.
///
/// Files named by `order` come first, in that order; the rest follow sorted
/// by [`SortKey`]. Names in `order` that no longer exist are dropped, and a
/// name listed twice is placed at its first occurrence.
pub fn reconcile(files: Vec<RemoteFile>, order: Option<&[String]>) -> Vec<RemoteFile> {
    let mut by_name: HashMap<String, RemoteFile> = HashMap::with_capacity(files.len());
    for file in files {
        if by_name.contains_key(&file.name) {
            log::warn!("Duplicate file name {} in listing, keeping the first", file.name);
            continue;
        }
        by_name.insert(file.name.clone(), file);
    }

    let mut result = Vec::with_capacity(by_name.len());
    for name in order.unwrap_or_default() {
        if let Some(file) = by_name.remove(name) {
            result.push(file);
        }
    }

    let mut remaining: Vec<RemoteFile> = by_name.into_values().collect();
    remaining.sort_by_cached_key(|f| SortKey::for_name(&f.name));
    result.extend(remaining);

    result
}
