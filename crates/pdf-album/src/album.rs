//! Album assembly: greedy, single-pass bin-packing of rendered pages.
//!
//! Pages are appended in story order to a growing document. Before each
//! append the document is serialized with the new page included; if that
//! exact size exceeds the limit and the document already has a page, the
//! document is finished and the page starts the next one. A page that is
//! too large on its own still gets an album to itself.

use crate::cache::{PageCache, RenderParams};
use crate::pages::DocumentBuilder;
use crate::remote::RemoteStore;
use crate::render::{RenderedUnit, render_unit};
use crate::settings::AlbumSettings;
use crate::types::*;
use lopdf::ObjectId;

/// Render and pack `units` into size-bounded PDF albums.
///
/// `on_progress` is called once per unit, in order, with the fraction of
/// units processed and a status line. Units that fail to decode are skipped
/// and reported in [`AlbumSet::skipped`]; remote failures abort the run.
pub fn assemble_albums(
    store: &dyn RemoteStore,
    units: &[ContentUnit],
    settings: &AlbumSettings,
    on_progress: impl FnMut(f32, &str),
) -> Result<AlbumSet> {
    let mut cache = PageCache::new();
    assemble_albums_cached(store, units, settings, &mut cache, on_progress)
}

/// [`assemble_albums`] with a caller-owned render cache
pub fn assemble_albums_cached(
    store: &dyn RemoteStore,
    units: &[ContentUnit],
    settings: &AlbumSettings,
    cache: &mut PageCache,
    mut on_progress: impl FnMut(f32, &str),
) -> Result<AlbumSet> {
    settings.validate()?;

    let params = RenderParams::from(settings);
    let mut packer = AlbumPacker::new(settings.max_output_bytes);
    let mut skipped = Vec::new();
    let total = units.len();

    for (index, unit) in units.iter().enumerate() {
        let rendered =
            cache.get_or_render(&unit.id, params, || render_unit(store, unit, settings));

        let message = match rendered {
            Ok(rendered) => {
                for page_id in rendered.page_ids() {
                    packer.place(rendered, page_id)?;
                }
                format!("Added {} ({}/{})", unit.filename, index + 1, total)
            }
            Err(e) if e.is_unit_local() => {
                log::warn!("Skipping {}: {}", unit.filename, e);
                skipped.push(SkippedUnit {
                    filename: unit.filename.clone(),
                    reason: e.to_string(),
                });
                format!("Skipped {} ({}/{})", unit.filename, index + 1, total)
            }
            Err(e) => return Err(e),
        };

        on_progress((index + 1) as f32 / total as f32, &message);
    }

    let mut set = packer.finish();
    set.skipped = skipped;
    Ok(set)
}

/// Online packer state: the open album plus everything already finished
struct AlbumPacker {
    max_bytes: u64,
    current: DocumentBuilder,
    /// Serialized form of `current`, as last measured
    current_bytes: Vec<u8>,
    current_sources: Vec<FileId>,
    albums: Vec<Album>,
    oversized: Vec<OversizedPage>,
}

impl AlbumPacker {
    fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            current: DocumentBuilder::new(),
            current_bytes: Vec::new(),
            current_sources: Vec::new(),
            albums: Vec::new(),
            oversized: Vec::new(),
        }
    }

    fn exceeds(&self, bytes: &[u8]) -> bool {
        bytes.len() as u64 > self.max_bytes
    }

    /// Place one page, closing the open album first if the page would push
    /// it over the limit
    fn place(&mut self, unit: &RenderedUnit, page_id: ObjectId) -> Result<()> {
        let mut tentative = self.current.clone();
        tentative.append_page(&unit.document, page_id)?;
        let tentative_bytes = tentative.to_bytes()?;

        if self.exceeds(&tentative_bytes) && !self.current.is_empty() {
            log::debug!(
                "Page of {} would grow album {} to {} bytes, starting a new album",
                unit.filename,
                self.albums.len() + 1,
                tentative_bytes.len()
            );
            self.finish_current();

            let mut fresh = DocumentBuilder::new();
            fresh.append_page(&unit.document, page_id)?;
            self.current_bytes = fresh.to_bytes()?;
            self.current = fresh;
        } else {
            self.current = tentative;
            self.current_bytes = tentative_bytes;
        }

        if self.current_sources.last() != Some(&unit.id) {
            self.current_sources.push(unit.id.clone());
        }

        if self.current.page_count() == 1 && self.exceeds(&self.current_bytes) {
            log::warn!(
                "Page of {} is {} bytes on its own, over the {} byte limit; placing it alone",
                unit.filename,
                self.current_bytes.len(),
                self.max_bytes
            );
            self.oversized.push(OversizedPage {
                filename: unit.filename.clone(),
                album_index: self.albums.len(),
                bytes: self.current_bytes.len(),
            });
        }

        Ok(())
    }

    fn finish_current(&mut self) {
        let builder = std::mem::take(&mut self.current);
        let album = Album {
            bytes: std::mem::take(&mut self.current_bytes),
            page_count: builder.page_count(),
            sources: std::mem::take(&mut self.current_sources),
        };
        log::info!(
            "Album {} finished: {} pages, {} bytes",
            self.albums.len() + 1,
            album.page_count,
            album.size()
        );
        self.albums.push(album);
    }

    fn finish(mut self) -> AlbumSet {
        if !self.current.is_empty() {
            self.finish_current();
        }
        AlbumSet {
            albums: self.albums,
            skipped: Vec::new(),
            oversized: self.oversized,
        }
    }
}
