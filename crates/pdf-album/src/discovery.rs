//! Folder listing and classification

use crate::constants::{IMAGE_EXTENSIONS, PDF_EXTENSIONS, TEXT_EXTENSIONS};
use crate::order::{ORDER_RECORD_NAME, load_order_from_listing, reconcile};
use crate::remote::RemoteStore;
use crate::render::decode_text;
use crate::types::*;

/// Options for [`discover_content_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiscoverOptions {
    /// Fetch and decode text units so they carry their content inline
    pub hydrate_text: bool,
}

/// Classify a filename by its extension
pub fn classify(filename: &str) -> ContentKind {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return ContentKind::Unknown;
    };
    let ext = ext.to_ascii_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        ContentKind::Image
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        ContentKind::Text
    } else if PDF_EXTENSIONS.contains(&ext.as_str()) {
        ContentKind::Pdf
    } else {
        ContentKind::Unknown
    }
}

/// List a folder as an ordered story
pub fn discover_content(
    store: &dyn RemoteStore,
    folder: &FolderHandle,
) -> Result<Vec<ContentUnit>> {
    discover_content_with(store, folder, &DiscoverOptions::default())
}

/// List a folder as an ordered story.
///
/// Unsupported files and the order record itself are left out. The
/// remaining files are ordered by [`reconcile`] against the saved order.
/// Listing failures surface as [`AlbumError::RemoteAccess`]; text that
/// fails to hydrate is logged and left without content.
pub fn discover_content_with(
    store: &dyn RemoteStore,
    folder: &FolderHandle,
    options: &DiscoverOptions,
) -> Result<Vec<ContentUnit>> {
    let files = store.list_files(folder)?;
    let saved_order = load_order_from_listing(store, &files);

    let candidates: Vec<RemoteFile> = files
        .into_iter()
        .filter(|f| f.name != ORDER_RECORD_NAME)
        .filter(|f| classify(&f.name) != ContentKind::Unknown)
        .collect();

    let mut units: Vec<ContentUnit> = reconcile(candidates, saved_order.as_deref())
        .into_iter()
        .map(|f| ContentUnit {
            kind: classify(&f.name),
            filename: f.name,
            id: f.id,
            thumbnail: f.thumbnail,
            text_content: None,
        })
        .collect();

    if options.hydrate_text {
        for unit in units.iter_mut().filter(|u| u.kind == ContentKind::Text) {
            match hydrate(store, unit) {
                Ok(text) => unit.text_content = Some(text),
                Err(e) => log::warn!("Could not load text of {}: {}", unit.filename, e),
            }
        }
    }

    log::debug!("Discovered {} units in {}", units.len(), folder);
    Ok(units)
}

fn hydrate(store: &dyn RemoteStore, unit: &ContentUnit) -> Result<String> {
    let bytes = store.fetch(&unit.id)?;
    decode_text(&unit.filename, bytes)
}
