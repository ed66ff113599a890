//! Image pages.
//!
//! The page is as wide as the standard page width and exactly as tall as
//! the image needs at that width, plus margins. Images are re-encoded as
//! JPEG at the configured quality and embedded with `DCTDecode`.

use crate::constants::{PAGE_WIDTH_MM, PDF_VERSION, mm_to_pt};
use crate::pages::user_unit_for;
use crate::settings::AlbumSettings;
use crate::types::*;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Document, Object, Stream};
use std::io::Cursor;

/// Geometry of an image page, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePageGeometry {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub content_width_pt: f32,
    pub content_height_pt: f32,
}

/// Page geometry for an image of `width` x `height` pixels
pub fn image_page_geometry(width: u32, height: u32, settings: &AlbumSettings) -> ImagePageGeometry {
    let margin_pt = mm_to_pt(settings.margin_mm);
    let content_width_pt = mm_to_pt(settings.content_width_mm());
    let aspect = height as f32 / width as f32;
    let content_height_pt = content_width_pt * aspect;

    ImagePageGeometry {
        page_width_pt: mm_to_pt(PAGE_WIDTH_MM),
        page_height_pt: content_height_pt + 2.0 * margin_pt,
        margin_pt,
        content_width_pt,
        content_height_pt,
    }
}

/// Decode, re-encode and wrap an image in a single-page document
pub fn render_image_page(filename: &str, bytes: &[u8], settings: &AlbumSettings) -> Result<Document> {
    let img = decode_oriented(bytes).map_err(|e| AlbumError::decode(filename, e))?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(AlbumError::decode(filename, "image has no pixels"));
    }

    let jpeg = encode_jpeg(img, settings.image_quality)
        .map_err(|e| AlbumError::decode(filename, e))?;
    let geometry = image_page_geometry(width, height, settings);

    Ok(build_image_document(jpeg, width, height, &geometry))
}

/// Decode an image and apply its EXIF orientation, so portrait photos
/// come out upright with their displayed aspect ratio
fn decode_oriented(bytes: &[u8]) -> image::ImageResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Flatten to RGB and encode as baseline JPEG
fn encode_jpeg(img: DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(img.into_rgb8());
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(buffer)
}

fn build_image_document(
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
    geometry: &ImagePageGeometry,
) -> Document {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let image_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"DCTDecode".to_vec())),
    ]);
    // Already JPEG; flate on top would only cost time
    let image_id = doc.add_object(Stream::new(image_dict, jpeg).with_compression(false));

    // Pages past the viewer limit are drawn in larger user units
    let unit = user_unit_for(geometry.page_height_pt);
    let content = format!(
        "q {} 0 0 {} {} {} cm /Im0 Do Q\n",
        geometry.content_width_pt / unit,
        geometry.content_height_pt / unit,
        geometry.margin_pt / unit,
        geometry.margin_pt / unit
    );
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(geometry.page_width_pt / unit),
                Object::Real(geometry.page_height_pt / unit),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]);
    if unit > 1.0 {
        log::debug!(
            "Image page is {:.0}pt tall, writing it with /UserUnit {}",
            geometry.page_height_pt,
            unit
        );
        page.set("UserUnit", Object::Real(unit));
    }
    let page_id = doc.add_object(page);

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}
