//! Editing the working list of a story.
//!
//! These functions only rearrange an in-memory list. Callers persist the
//! result with [`crate::persist_order`] once an edit is complete.

use crate::constants::{MIME_TEXT, TEXT_EXTENSIONS};
use crate::order::SortKey;
use crate::remote::RemoteStore;
use crate::types::*;
use std::collections::HashSet;

/// Remove the units at `indices` and return them in list order.
///
/// Duplicate and out-of-range indices are ignored. Serves both cut (keep the
/// returned units as a clipboard) and delete (drop them).
pub fn remove_units(list: &mut Vec<ContentUnit>, indices: &[usize]) -> Vec<ContentUnit> {
    let selected: HashSet<usize> = indices.iter().copied().filter(|&i| i < list.len()).collect();
    if selected.is_empty() {
        return Vec::new();
    }

    let mut removed = Vec::with_capacity(selected.len());
    let mut kept = Vec::with_capacity(list.len() - selected.len());
    for (i, unit) in list.drain(..).enumerate() {
        if selected.contains(&i) {
            removed.push(unit);
        } else {
            kept.push(unit);
        }
    }
    *list = kept;
    removed
}

/// Insert `clipboard` right after `after`, or at the start when there is no
/// anchor. An anchor past the end appends.
pub fn paste_units(list: &mut Vec<ContentUnit>, clipboard: Vec<ContentUnit>, after: Option<usize>) {
    let at = match after {
        Some(i) => (i + 1).min(list.len()),
        None => 0,
    };
    list.splice(at..at, clipboard);
}

/// Insert one unit at `position`, or append it
pub fn insert_unit(list: &mut Vec<ContentUnit>, position: Option<usize>, unit: ContentUnit) {
    match position {
        Some(i) => list.insert(i.min(list.len()), unit),
        None => list.push(unit),
    }
}

/// Replace the unit at `index` with the pages it was split into
pub fn replace_with_split(list: &mut Vec<ContentUnit>, index: usize, new_units: Vec<ContentUnit>) {
    if index >= list.len() {
        log::warn!("Split target {} is out of range, appending pages", index);
        list.extend(new_units);
        return;
    }
    list.splice(index..=index, new_units);
}

/// Units of the folder that are not yet part of the story, by filename.
///
/// Sorted case-insensitively, as offered by quick-sort.
pub fn unsorted_units(all: &[ContentUnit], story: &[ContentUnit]) -> Vec<ContentUnit> {
    let placed: HashSet<&str> = story.iter().map(|u| u.filename.as_str()).collect();
    let mut unsorted: Vec<ContentUnit> = all
        .iter()
        .filter(|u| !placed.contains(u.filename.as_str()))
        .cloned()
        .collect();
    unsorted.sort_by_cached_key(|u| SortKey::for_name(&u.filename));
    unsorted
}

/// End a quick-sort session: whatever was not picked goes to the end
pub fn finish_quick_sort(story: &mut Vec<ContentUnit>, remaining: Vec<ContentUnit>) {
    story.extend(remaining);
}

/// Create a text unit in `folder` holding `content`.
///
/// The filename must end in `.txt`; a style tag may precede it
/// (`title.h1.txt`). The returned unit already carries its text.
pub fn create_text_unit(
    store: &dyn RemoteStore,
    folder: &FolderHandle,
    filename: &str,
    content: &str,
) -> Result<ContentUnit> {
    let has_text_extension = filename
        .rsplit_once('.')
        .is_some_and(|(base, ext)| {
            !base.is_empty() && TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        });
    if !has_text_extension {
        return Err(AlbumError::Config(format!(
            "Text unit name must end in .txt, got {:?}",
            filename
        )));
    }

    let uploaded = store.upload(folder, filename, MIME_TEXT, content.as_bytes().to_vec())?;
    log::info!("Created text unit {}", uploaded.name);

    Ok(ContentUnit {
        filename: uploaded.name,
        id: uploaded.id,
        kind: ContentKind::Text,
        thumbnail: uploaded.thumbnail,
        text_content: Some(content.to_string()),
    })
}
