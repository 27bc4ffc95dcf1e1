//! Rasterizer seam
//!
//! The atlas builder only needs one operation from a font library:
//! render a codepoint to an 8-bit coverage bitmap plus its metrics.
//! Backends (FreeType, fontdue) implement [`GlyphRasterizer`].

use super::error::AtlasError;

/// One rendered glyph as produced by a font library
///
/// `buffer` holds `rows` rows of `pitch` bytes each. Only the first
/// `width` bytes of every row are coverage; the rest is row padding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterGlyph {
    /// Visible bitmap width (pixels)
    pub width: u32,
    /// Bitmap height (rows)
    pub rows: u32,
    /// Bytes from one row start to the next (>= width)
    pub pitch: usize,
    /// Coverage rows (len >= rows * pitch)
    pub buffer: Vec<u8>,
    /// Horizontal pen advance (26.6 fixed point)
    pub advance_x: i64,
    /// Vertical pen advance (26.6 fixed point)
    pub advance_y: i64,
    /// Pen x to bitmap left edge (pixels)
    pub bitmap_left: i32,
    /// Baseline to bitmap top edge, y up (pixels)
    pub bitmap_top: i32,
}

impl RasterGlyph {
    /// Glyph with no ink (e.g. space): advances only
    pub fn blank(advance_x: i64, advance_y: i64) -> Self {
        Self {
            advance_x,
            advance_y,
            ..Self::default()
        }
    }

    /// True if the bitmap covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.rows == 0
    }

    /// Coverage bytes of row `r` (visible width only)
    pub fn row(&self, r: usize) -> &[u8] {
        let start = r * self.pitch;
        &self.buffer[start..start + self.width as usize]
    }
}

/// A font face with its pixel size already fixed
pub trait GlyphRasterizer {
    /// Render `codepoint` as an 8-bit greyscale bitmap
    ///
    /// Codepoints the font has no glyph for render whatever the font
    /// maps them to (usually `.notdef`); only load or render failures
    /// are errors.
    fn rasterize(&self, codepoint: u32) -> Result<RasterGlyph, AtlasError>;

    /// Baseline-to-baseline distance (pixels)
    fn line_height(&self) -> i32;
}

/// Validate a requested pixel size and convert it to whole pixels
pub(crate) fn pixel_size(font_size: f32) -> Result<u32, AtlasError> {
    if !font_size.is_finite() || font_size < 1.0 {
        return Err(AtlasError::PixelSize(
            font_size,
            "size must be a finite value of at least 1px".to_string(),
        ));
    }
    Ok(font_size as u32)
}
