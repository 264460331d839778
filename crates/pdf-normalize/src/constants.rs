//! Shared constants for page normalization
//!
//! This module centralizes magic numbers and constants used throughout
//! the normalization process.

// =============================================================================
// Target Presets
// =============================================================================

/// A4 width in points as used by the reference tool.
///
/// ISO A4 is 595.28 x 841.89 pt. The reference value is kept so output
/// dimensions stay identical; use `PaperSize::Custom` to override.
pub const A4_WIDTH_PT: f64 = 594.96;

/// A4 height in points as used by the reference tool
pub const A4_HEIGHT_PT: f64 = 841.92;

/// US Letter width in points (8.5")
pub const LETTER_WIDTH_PT: f64 = 612.0;

/// US Letter height in points (11")
pub const LETTER_HEIGHT_PT: f64 = 792.0;

// =============================================================================
// Geometry
// =============================================================================

/// Largest aspect ratio difference, in whole percentage points, that still
/// counts as compatible (Stretch rather than FitCenter)
pub const RATIO_TOLERANCE_PCT: i64 = 1;

/// Full turn in degrees
pub const FULL_TURN_DEGREES: i32 = 360;

/// Parent links followed when resolving inherited page attributes
pub const MAX_INHERITANCE_DEPTH: usize = 32;

/// Page boxes resized along with the MediaBox when they match it
pub const SECONDARY_BOXES: [&[u8]; 4] = [b"CropBox", b"BleedBox", b"TrimBox", b"ArtBox"];

/// Annotation entries holding flat `x y x y ...` number arrays
pub const ANNOTATION_POINT_KEYS: [&[u8]; 6] =
    [b"Rect", b"QuadPoints", b"Vertices", b"L", b"RD", b"CL"];

// =============================================================================
// Transport
// =============================================================================

/// MIME type used for data URIs
pub const PDF_MIME_TYPE: &str = "application/pdf";
