//! Shared constants for album assembly
//!
//! Page geometry, unit conversion and the file-type tables used to
//! classify folder contents.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Page Geometry
// =============================================================================

/// Width of every rendered page (A4 width). Heights are content-dependent.
pub const PAGE_WIDTH_MM: f32 = 210.0;

/// Largest page dimension, in default user space units, that PDF viewers
/// accept. Taller pages are written with a `/UserUnit` scale instead.
pub const MAX_PAGE_DIMENSION_PT: f32 = 14_400.0;

/// PDF version written for assembled and split documents
pub const PDF_VERSION: &str = "1.7";

// =============================================================================
// Content Classification
// =============================================================================

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
pub const TEXT_EXTENSIONS: &[&str] = &["txt"];
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_JSON: &str = "application/json";

// =============================================================================
// Splitting
// =============================================================================

/// Separator between the base name and the page index of split pages
pub const SPLIT_PAGE_SEPARATOR: &str = "_page_";

/// Minimum number of digits in a split page index
pub const SPLIT_INDEX_MIN_WIDTH: usize = 3;
