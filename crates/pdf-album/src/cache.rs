//! Rendered-unit cache.
//!
//! Keyed by content id. Each entry remembers the render parameters it was
//! produced with, so changing the quality or margin turns every lookup into
//! a miss without scanning. Entries are dropped explicitly when a unit is
//! split or deleted.

use crate::render::RenderedUnit;
use crate::settings::AlbumSettings;
use crate::types::{ContentUnit, FileId, Result};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// The settings that change how a unit renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderParams {
    pub image_quality: u8,
    margin_bits: u32,
}

impl From<&AlbumSettings> for RenderParams {
    fn from(settings: &AlbumSettings) -> Self {
        Self {
            image_quality: settings.image_quality,
            margin_bits: settings.margin_mm.to_bits(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    params: RenderParams,
    unit: RenderedUnit,
}

#[derive(Debug, Clone, Default)]
pub struct PageCache {
    entries: HashMap<FileId, CacheEntry>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached unit for `id`, rendering it first on a miss.
    ///
    /// A failed render leaves the cache as it was.
    pub fn get_or_render<F>(
        &mut self,
        id: &FileId,
        params: RenderParams,
        render: F,
    ) -> Result<&RenderedUnit>
    where
        F: FnOnce() -> Result<RenderedUnit>,
    {
        match self.entries.entry(id.clone()) {
            Entry::Occupied(mut slot) => {
                if slot.get().params != params {
                    let unit = render()?;
                    slot.insert(CacheEntry { params, unit });
                }
                Ok(&slot.into_mut().unit)
            }
            Entry::Vacant(slot) => {
                let unit = render()?;
                Ok(&slot.insert(CacheEntry { params, unit }).unit)
            }
        }
    }

    /// Drop the entry for `id`; returns whether there was one
    pub fn invalidate(&mut self, id: &FileId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drop the entries of all `units`, e.g. after a delete or split
    pub fn invalidate_units(&mut self, units: &[ContentUnit]) -> usize {
        units.iter().filter(|u| self.invalidate(&u.id)).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
