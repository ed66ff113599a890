#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream};
use pdf_album::*;
use std::io::Cursor;

pub fn folder() -> FolderHandle {
    FolderHandle::from("story")
}

/// A PDF whose page `i` has the content stream `% page i` (1-based)
pub fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    create_padded_pdf(num_pages, 0)
}

/// Like [`create_test_pdf`], with `noise_bytes` of incompressible filler on
/// every page
pub fn create_padded_pdf(num_pages: usize, noise_bytes: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut seed = 0x2545_f491_u32;

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = format!("% page {}", i + 1).into_bytes();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

        let mut resources = Dictionary::new();
        if noise_bytes > 0 {
            let filler = noise(&mut seed, noise_bytes);
            let filler_id = doc.add_object(Stream::new(Dictionary::new(), filler));
            resources.set("Filler", Object::Reference(filler_id));
        }

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

/// xorshift32 filler; deflate cannot shrink it
fn noise(seed: &mut u32, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        let mut x = *seed;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        *seed = x;
        out.extend_from_slice(&x.to_le_bytes());
    }
    out.truncate(len);
    out
}

/// A gradient test image encoded as `format`
pub fn test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Add a file to the store and return it as a unit
pub fn add_unit(store: &MemoryStore, name: &str, bytes: Vec<u8>) -> ContentUnit {
    let id = store.add_file(&folder(), name, bytes);
    ContentUnit::new(name, id, classify(name))
}

/// Content stream of every page of a PDF, in page order
pub fn page_contents(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    pages::page_ids(&doc)
        .into_iter()
        .map(|id| String::from_utf8_lossy(&pages::page_content(&doc, id).unwrap()).into_owned())
        .collect()
}

/// (width, height) in points of every page of a PDF
pub fn page_sizes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let doc = Document::load_mem(pdf).unwrap();
    pages::page_ids(&doc)
        .into_iter()
        .map(|id| pages::page_size(&doc, id).unwrap())
        .collect()
}

pub fn names(units: &[ContentUnit]) -> Vec<&str> {
    units.iter().map(|u| u.filename.as_str()).collect()
}
