//! Page rendering
//!
//! Each content unit becomes a small standalone PDF document:
//! - images: one page sized to the image (see [`raster`])
//! - text: one page sized to the wrapped text (see [`text`])
//! - PDF units: the unit's own pages, passed through unchanged

pub mod fonts;
pub mod raster;
pub mod text;

pub use text::{TextStyle, decode_text};

use crate::pages::page_ids;
use crate::remote::RemoteStore;
use crate::settings::AlbumSettings;
use crate::types::*;
use lopdf::{Document, ObjectId};

/// A rendered content unit, ready to be appended to an album
#[derive(Debug, Clone)]
pub struct RenderedUnit {
    pub id: FileId,
    pub filename: String,
    pub document: Document,
}

impl RenderedUnit {
    /// Page object ids in page order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        page_ids(&self.document)
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }
}

/// Fetch a unit's bytes and render it.
///
/// Payload problems come back as [`AlbumError::Decode`]; fetch failures as
/// [`AlbumError::RemoteAccess`].
pub fn render_unit(
    store: &dyn RemoteStore,
    unit: &ContentUnit,
    settings: &AlbumSettings,
) -> Result<RenderedUnit> {
    if unit.kind == ContentKind::Unknown {
        return Err(AlbumError::UnsupportedKind {
            filename: unit.filename.clone(),
            kind: unit.kind,
        });
    }

    let bytes = store.fetch(&unit.id)?;
    let document = render_bytes(unit, bytes, settings)?;

    Ok(RenderedUnit {
        id: unit.id.clone(),
        filename: unit.filename.clone(),
        document,
    })
}

/// Render already-fetched bytes of a unit
pub fn render_bytes(unit: &ContentUnit, bytes: Vec<u8>, settings: &AlbumSettings) -> Result<Document> {
    match unit.kind {
        ContentKind::Image => raster::render_image_page(&unit.filename, &bytes, settings),
        ContentKind::Text => {
            let content = decode_text(&unit.filename, bytes)?;
            text::render_text_document(&unit.filename, &content, settings)
        }
        ContentKind::Pdf => load_passthrough(&unit.filename, &bytes),
        ContentKind::Unknown => Err(AlbumError::UnsupportedKind {
            filename: unit.filename.clone(),
            kind: unit.kind,
        }),
    }
}

/// Parse an existing PDF unit without touching its pages
fn load_passthrough(filename: &str, bytes: &[u8]) -> Result<Document> {
    let document = Document::load_mem(bytes).map_err(|e| AlbumError::decode(filename, e))?;
    if document.get_pages().is_empty() {
        return Err(AlbumError::decode(filename, "PDF has no pages"));
    }
    Ok(document)
}
