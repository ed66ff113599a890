//! Text pages.
//!
//! A text unit becomes a page exactly tall enough for its wrapped text.
//! Layout runs twice: a dry run measures the wrapped lines at the content
//! width, then the page is built at the measured height.

use super::fonts::{FontFace, encode_winansi, restrict_to_winansi, wrap_text};
use crate::constants::{PAGE_WIDTH_MM, mm_to_pt, pt_to_mm};
use crate::pages::{page_content, page_ids, user_unit_for};
use crate::settings::AlbumSettings;
use crate::types::*;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use printpdf::{Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem};

/// Page boxes rescaled along with the content when `/UserUnit` is applied
const PAGE_BOXES: [&[u8]; 5] = [b"MediaBox", b"CropBox", b"BleedBox", b"TrimBox", b"ArtBox"];

/// Text style, selected by the tag before `.txt` (`intro.h1.txt`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

/// Typography of one style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSpec {
    pub face: FontFace,
    pub size_pt: f32,
    /// Line height as a multiple of the font size
    pub line_spacing: f32,
    pub alignment: Alignment,
}

impl StyleSpec {
    pub fn line_height_pt(&self) -> f32 {
        self.size_pt * self.line_spacing
    }
}

impl TextStyle {
    /// Parse the style tag out of a filename; unknown or missing tags are paragraphs
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        let stem = lower.strip_suffix(".txt").unwrap_or(&lower);
        match stem.rsplit_once('.').map(|(_, tag)| tag) {
            Some("h1") => TextStyle::Heading1,
            Some("h2") => TextStyle::Heading2,
            _ => TextStyle::Paragraph,
        }
    }

    pub fn spec(self) -> StyleSpec {
        match self {
            TextStyle::Paragraph => StyleSpec {
                face: FontFace::Helvetica,
                size_pt: 12.0,
                line_spacing: 1.5,
                alignment: Alignment::Left,
            },
            TextStyle::Heading1 => StyleSpec {
                face: FontFace::HelveticaBold,
                size_pt: 24.0,
                line_spacing: 1.2,
                alignment: Alignment::Center,
            },
            TextStyle::Heading2 => StyleSpec {
                face: FontFace::HelveticaBold,
                size_pt: 18.0,
                line_spacing: 1.3,
                alignment: Alignment::Left,
            },
        }
    }
}

/// Result of the measuring pass
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub spec: StyleSpec,
    pub content_width_pt: f32,
    pub page_height_pt: f32,
}

/// Dry-run layout: wrap `text` at the content width and size the page.
///
/// Empty text still occupies one line so the page has a height.
pub fn measure_text(text: &str, style: TextStyle, settings: &AlbumSettings) -> TextLayout {
    let spec = style.spec();
    let content_width_pt = mm_to_pt(settings.content_width_mm());

    let mut lines = wrap_text(text, spec.face, spec.size_pt, content_width_pt);
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let block_height = lines.len() as f32 * spec.line_height_pt();
    let page_height_pt = block_height + 2.0 * mm_to_pt(settings.margin_mm);

    TextLayout {
        lines,
        spec,
        content_width_pt,
        page_height_pt,
    }
}

/// Build the single-page PDF for a measured layout
pub fn render_text_page(layout: &TextLayout, settings: &AlbumSettings) -> Vec<u8> {
    let spec = &layout.spec;
    let margin_pt = mm_to_pt(settings.margin_mm);
    let line_height = spec.line_height_pt();
    // Baseline sits above the bottom of its line box by the half-leading
    // plus the descender
    let baseline_offset = (line_height - spec.size_pt) / 2.0 + spec.size_pt * 0.21;

    let mut ops = Vec::new();
    for (i, line) in layout.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }

        let box_bottom = layout.page_height_pt - margin_pt - (i + 1) as f32 * line_height;
        let x = match spec.alignment {
            Alignment::Left => margin_pt,
            Alignment::Center => {
                let width = spec.face.text_width(line, spec.size_pt);
                margin_pt + ((layout.content_width_pt - width) / 2.0).max(0.0)
            }
        };

        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(x),
                y: Pt(box_bottom + baseline_offset),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            font: spec.face.builtin(),
            size: Pt(spec.size_pt),
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(line.clone())],
            font: spec.face.builtin(),
        });
        ops.push(Op::EndTextSection);
    }

    let mut doc = PdfDocument::new("Text");
    doc.pages.push(PdfPage::new(
        Mm(PAGE_WIDTH_MM),
        Mm(pt_to_mm(layout.page_height_pt)),
        ops,
    ));

    let mut warnings = Vec::new();
    doc.save(&PdfSaveOptions::default(), &mut warnings)
}

/// Lay out and render a text unit as a one-page document.
///
/// Characters the standard fonts cannot show are replaced with `?` before
/// layout. String operands are written as WinAnsi bytes to match the font
/// encoding, and pages past the viewer height limit get a `/UserUnit`.
pub fn render_text_document(
    filename: &str,
    text: &str,
    settings: &AlbumSettings,
) -> Result<Document> {
    let (text, replaced) = restrict_to_winansi(text);
    if replaced > 0 {
        log::warn!(
            "{}: replaced {} character(s) outside the WinAnsi set with '?'",
            filename,
            replaced
        );
    }

    let layout = measure_text(&text, TextStyle::from_filename(filename), settings);
    let pdf = render_text_page(&layout, settings);
    let mut doc = Document::load_mem(&pdf).map_err(|e| AlbumError::decode(filename, e))?;

    let unit = user_unit_for(layout.page_height_pt);
    if unit > 1.0 {
        log::info!(
            "{}: page is {:.0}pt tall, writing it with /UserUnit {}",
            filename,
            layout.page_height_pt,
            unit
        );
    }

    for page_id in page_ids(&doc) {
        let raw = page_content(&doc, page_id)?;
        let mut content = Content::decode(&raw).map_err(|e| AlbumError::decode(filename, e))?;
        for op in &mut content.operations {
            if matches!(op.operator.as_str(), "Tj" | "TJ" | "'" | "\"") {
                op.operands.iter_mut().for_each(encode_text_operand);
            }
        }
        if unit > 1.0 {
            let scale = Object::Real(1.0 / unit);
            let zero = Object::Integer(0);
            let cm = vec![scale.clone(), zero.clone(), zero.clone(), scale, zero.clone(), zero];
            content.operations.insert(0, Operation::new("cm", cm));
        }

        let stream = Stream::new(Dictionary::new(), content.encode()?);
        let content_id = doc.add_object(stream);
        let page = doc.get_dictionary_mut(page_id)?;
        page.set("Contents", Object::Reference(content_id));
        if unit > 1.0 {
            for key in PAGE_BOXES {
                if let Ok(Object::Array(values)) = page.get_mut(key) {
                    for value in values.iter_mut() {
                        if let Ok(n) = value.as_float() {
                            *value = Object::Real(n / unit);
                        }
                    }
                }
            }
            page.set("UserUnit", Object::Real(unit));
        }
    }

    Ok(doc)
}

/// Rewrite a UTF-8 string operand as WinAnsi bytes; other operands are left alone
fn encode_text_operand(operand: &mut Object) {
    match operand {
        Object::String(bytes, _) => {
            if let Ok(text) = std::str::from_utf8(bytes) {
                *bytes = encode_winansi(text);
            }
        }
        Object::Array(items) => items.iter_mut().for_each(encode_text_operand),
        _ => {}
    }
}

/// Decode text bytes as UTF-8, dropping a leading byte order mark
pub fn decode_text(filename: &str, bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|e| AlbumError::decode(filename, e))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_from_filename() {
        assert_eq!(TextStyle::from_filename("010_intro.h1.txt"), TextStyle::Heading1);
        assert_eq!(TextStyle::from_filename("part.H2.TXT"), TextStyle::Heading2);
        assert_eq!(TextStyle::from_filename("body.p.txt"), TextStyle::Paragraph);
        assert_eq!(TextStyle::from_filename("notes.txt"), TextStyle::Paragraph);
        assert_eq!(TextStyle::from_filename("v1.2.txt"), TextStyle::Paragraph);
    }

    #[test]
    fn styles_are_distinct() {
        let p = TextStyle::Paragraph.spec();
        let h1 = TextStyle::Heading1.spec();
        let h2 = TextStyle::Heading2.spec();
        assert!(h1.size_pt > h2.size_pt && h2.size_pt > p.size_pt);
        assert_eq!(h1.alignment, Alignment::Center);
        assert_eq!(p.face, FontFace::Helvetica);
        assert_ne!(p.line_spacing, h1.line_spacing);
    }

    #[test]
    fn page_height_follows_line_count() {
        let settings = AlbumSettings {
            margin_mm: 10.0,
            ..Default::default()
        };
        let one = measure_text("short", TextStyle::Paragraph, &settings);
        let three = measure_text("a\nb\nc", TextStyle::Paragraph, &settings);

        let line = TextStyle::Paragraph.spec().line_height_pt();
        let margins = 2.0 * mm_to_pt(10.0);
        assert!((one.page_height_pt - (line + margins)).abs() < 0.01);
        assert!((three.page_height_pt - (3.0 * line + margins)).abs() < 0.01);
    }

    #[test]
    fn empty_text_still_gets_a_line() {
        let layout = measure_text("\n\n", TextStyle::Heading2, &AlbumSettings::default());
        assert_eq!(layout.lines.len(), 1);
        assert!(layout.page_height_pt > 0.0);
    }

    fn text_operands(doc: &Document) -> Vec<Vec<u8>> {
        let page_id = page_ids(doc)[0];
        let content = Content::decode(&page_content(doc, page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first())
            .filter_map(|o| o.as_str().ok().map(<[u8]>::to_vec))
            .collect()
    }

    #[test]
    fn strings_are_written_in_winansi() {
        let doc = render_text_document("kap.h1.txt", "Kapitel Ett: åäö Ö → ✓", &AlbumSettings::default())
            .unwrap();
        let strings = text_operands(&doc);
        assert_eq!(strings, [b"Kapitel Ett: \xE5\xE4\xF6 \xD6 ? ?".to_vec()]);
    }

    #[test]
    fn tall_text_pages_use_user_unit() {
        let text = "line\n".repeat(1000);
        let doc = render_text_document("long.txt", &text, &AlbumSettings::default()).unwrap();
        let page_id = page_ids(&doc)[0];

        let unit = crate::pages::user_unit(&doc, page_id);
        let (_, height) = crate::pages::page_size(&doc, page_id).unwrap();
        assert!(unit > 1.0);
        assert!(height <= crate::constants::MAX_PAGE_DIMENSION_PT);
        // 1000 lines of 12pt at 1.5 line height
        assert!((height * unit - 18_000.0).abs() < 1.0);
        assert_eq!(text_operands(&doc).len(), 1000);
    }

    #[test]
    fn decode_strips_bom_and_rejects_invalid_utf8() {
        assert_eq!(decode_text("a.txt", b"\xef\xbb\xbfhej".to_vec()).unwrap(), "hej");
        assert!(matches!(
            decode_text("a.txt", vec![0xff, 0xfe, 0x00]),
            Err(AlbumError::Decode { .. })
        ));
    }
}
