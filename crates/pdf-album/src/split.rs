//! Splitting multi-page PDF units into one unit per page

use crate::constants::{MIME_PDF, SPLIT_INDEX_MIN_WIDTH, SPLIT_PAGE_SEPARATOR};
use crate::pages::{DocumentBuilder, page_ids};
use crate::remote::RemoteStore;
use crate::types::*;
use lopdf::Document;
use std::collections::HashSet;

/// Name of page `index` (0-based) of `total` split from `filename`.
///
/// The index is 1-based and zero-padded wide enough that the names sort in
/// page order: `doc.pdf` page 0 of 5 is `doc_page_001.pdf`.
pub fn split_page_name(filename: &str, index: usize, total: usize) -> String {
    let base = match filename.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => filename,
    };
    let width = SPLIT_INDEX_MIN_WIDTH.max(total.to_string().len());
    format!(
        "{}{}{:0width$}.pdf",
        base,
        SPLIT_PAGE_SEPARATOR,
        index + 1,
        width = width
    )
}

/// Page names for splitting `filename` into `total` pages that collide with
/// nothing in `existing` (compared case-insensitively).
///
/// The first run uses the plain [`split_page_name`]s. If any of them is
/// taken, later runs add a counter before the extension
/// (`doc_page_001 (2).pdf`), so every run stays in page order.
pub fn unique_split_names(filename: &str, total: usize, existing: &[String]) -> Vec<String> {
    let taken: HashSet<String> = existing.iter().map(|n| n.to_lowercase()).collect();
    let mut run = 1;
    loop {
        let names: Vec<String> = (0..total)
            .map(|index| with_run(split_page_name(filename, index, total), run))
            .collect();
        if names.iter().all(|n| !taken.contains(&n.to_lowercase())) {
            return names;
        }
        run += 1;
    }
}

fn with_run(name: String, run: usize) -> String {
    match (run, name.strip_suffix(".pdf")) {
        (1, _) | (_, None) => name,
        (_, Some(stem)) => format!("{} ({}).pdf", stem, run),
    }
}

/// Upload each page of a PDF unit as its own single-page PDF.
///
/// Page names never collide with files already in `folder`, so splitting
/// the same document twice adds a second set of pages rather than
/// duplicate names. Returns the new units in page order. The original
/// file is left in place; replacing it in the working list and persisting the order is up
/// to the caller (see [`crate::replace_with_split`]). If an upload fails
/// part-way, pages already uploaded stay in the folder and will show up as
/// new files on the next discovery.
pub fn split_pdf_unit(
    store: &dyn RemoteStore,
    folder: &FolderHandle,
    unit: &ContentUnit,
) -> Result<Vec<ContentUnit>> {
    if unit.kind != ContentKind::Pdf {
        return Err(AlbumError::UnsupportedKind {
            filename: unit.filename.clone(),
            kind: unit.kind,
        });
    }

    let bytes = store.fetch(&unit.id)?;
    let source =
        Document::load_mem(&bytes).map_err(|e| AlbumError::decode(&unit.filename, e))?;

    let pages = page_ids(&source);
    if pages.is_empty() {
        return Err(AlbumError::decode(&unit.filename, "PDF has no pages"));
    }

    let total = pages.len();
    let existing: Vec<String> = store
        .list_files(folder)?
        .into_iter()
        .map(|file| file.name)
        .collect();
    let names = unique_split_names(&unit.filename, total, &existing);
    if names[0] != split_page_name(&unit.filename, 0, total) {
        log::info!(
            "{} was split before, naming the new pages like {}",
            unit.filename,
            names[0]
        );
    }
    let mut units = Vec::with_capacity(total);

    for (page_id, name) in pages.into_iter().zip(names) {
        let mut builder = DocumentBuilder::new();
        builder.append_page(&source, page_id)?;
        let page_bytes = builder.to_bytes()?;

        let uploaded = store.upload(folder, &name, MIME_PDF, page_bytes)?;
        log::debug!("Uploaded {} as {}", name, uploaded.id);

        units.push(ContentUnit {
            filename: uploaded.name,
            id: uploaded.id,
            kind: ContentKind::Pdf,
            thumbnail: uploaded.thumbnail,
            text_content: None,
        });
    }

    log::info!("Split {} into {} pages", unit.filename, total);
    Ok(units)
}
