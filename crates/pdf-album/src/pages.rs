//! Page-level PDF plumbing shared by assembly and splitting.
//!
//! Pages are moved between documents by deep-copying the page dictionary
//! and everything it references into the target, then hanging the copy
//! under the target's own page tree.

use crate::constants::{MAX_PAGE_DIMENSION_PT, PDF_VERSION};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: &[&[u8]] = &[b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

// =============================================================================
// Document Builder
// =============================================================================

/// A document under construction: a flat page tree that pages are appended to.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kids.is_empty()
    }

    /// Copy `page_id` of `source` onto the end of this document
    pub fn append_page(&mut self, source: &Document, page_id: ObjectId) -> Result<()> {
        let new_id = copy_page(&mut self.doc, source, page_id, self.pages_id)?;
        self.kids.push(new_id);
        Ok(())
    }

    /// Serialize the document as it stands. The builder itself is unchanged,
    /// so the same builder can be measured, extended and measured again.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.doc.clone();

        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(self.kids.len() as i64)),
        ]);
        doc.objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);

        doc.compress();

        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok(writer)
    }
}

// =============================================================================
// Page Copy
// =============================================================================

/// Page object ids of a document, in page order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Deep-copy a page into `target` and parent it under `parent_id`.
///
/// Inherited attributes are resolved from the source tree and written onto
/// the copy so it stands on its own.
pub fn copy_page(
    target: &mut Document,
    source: &Document,
    page_id: ObjectId,
    parent_id: ObjectId,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;

    // Reserve the id first so back-references to the page (annotations'
    // /P entries) resolve to the copy instead of dragging the tree along.
    let new_page_id = target.new_object_id();
    let mut cache = HashMap::new();
    cache.insert(page_id, new_page_id);

    let mut new_dict = Dictionary::new();
    for (key, value) in page_dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(target, source, value, &mut cache)?);
    }

    for key in INHERITABLE_KEYS {
        if new_dict.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(source, page_dict, key) {
            new_dict.set(key.to_vec(), copy_object_deep(target, source, &value, &mut cache)?);
        }
    }

    new_dict.set("Parent", Object::Reference(parent_id));
    target
        .objects
        .insert(new_page_id, Object::Dictionary(new_dict));

    Ok(new_page_id)
}

/// Look an attribute up the page tree, starting at the page's parent
fn inherited_attribute(doc: &Document, page_dict: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut current = page_dict.get(b"Parent").and_then(Object::as_reference).ok();
    // Bounded walk; malformed files can contain parent cycles
    for _ in 0..64 {
        let id = current?;
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Deep copy an object from source to target, following references.
///
/// The cache maps source ids to target ids and is filled before recursing,
/// so reference cycles terminate. Other pages and page-tree nodes reached
/// through references (link destinations, stray parents) become `null`.
pub fn copy_object_deep(
    target: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let referenced = match source.get_object(*id) {
                Ok(obj) => obj,
                Err(_) => return Ok(Object::Null),
            };
            if is_page_tree_node(referenced) {
                return Ok(Object::Null);
            }

            let new_id = target.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(target, source, referenced, cache)?;
            target.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(target, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(target, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(target, source, value, cache)?);
            }
            Ok(Object::Stream(Stream {
                dict: new_dict,
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: None,
            }))
        }
        _ => Ok(obj.clone()),
    }
}

fn is_page_tree_node(obj: &Object) -> bool {
    let Object::Dictionary(dict) = obj else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Page") | Ok(b"Pages")
    )
}

// =============================================================================
// Page Inspection
// =============================================================================

/// Decoded content stream of a page; multiple streams are joined by newlines
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()),
    };

    let refs = match contents {
        Object::Reference(id) => vec![*id],
        Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => Vec::new(),
    };

    let mut result = Vec::new();
    for (i, id) in refs.iter().enumerate() {
        if let Ok(stream) = doc.get_object(*id).and_then(Object::as_stream) {
            if i > 0 {
                result.push(b'\n');
            }
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            result.extend_from_slice(&content);
        }
    }
    Ok(result)
}

/// `/UserUnit` needed for a page `height_pt` tall to stay within viewer
/// limits; 1.0 when no scaling is needed. Rounded up to hundredths.
pub fn user_unit_for(height_pt: f32) -> f32 {
    if height_pt <= MAX_PAGE_DIMENSION_PT {
        1.0
    } else {
        (height_pt / MAX_PAGE_DIMENSION_PT * 100.0).ceil() / 100.0
    }
}

/// Scale factor from `/UserUnit`, 1.0 when absent
pub fn user_unit(doc: &Document, page_id: ObjectId) -> f32 {
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|dict| dict.get(b"UserUnit").ok())
        .and_then(extract_number)
        .unwrap_or(1.0)
}

/// Page size (width, height) in points, from the page or its ancestors
pub fn page_size(doc: &Document, page_id: ObjectId) -> Option<(f32, f32)> {
    let page_dict = doc.get_dictionary(page_id).ok()?;
    let media_box = match page_dict.get(b"MediaBox") {
        Ok(obj) => Some(obj.clone()),
        Err(_) => inherited_attribute(doc, page_dict, b"MediaBox"),
    };

    let numbers: Vec<f32> = media_box
        .as_ref()
        .and_then(|mb| mb.as_array().ok())
        .map(|arr| arr.iter().filter_map(extract_number).collect())
        .unwrap_or_default();

    match numbers.as_slice() {
        [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
        _ => None,
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
