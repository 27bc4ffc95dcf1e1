//! fontdue backend
//!
//! Pure Rust rasterizer, no system library needed.
//! Bitmaps come back tightly packed, so pitch == width.

use fontdue::{Font, FontSettings};
use log::info;
use std::path::Path;

use super::error::AtlasError;
use super::rasterizer::{pixel_size, GlyphRasterizer, RasterGlyph};

/// fontdue font at a fixed pixel size
pub struct FontdueFace {
    font: Font,
    /// Rasterize size (pixels)
    size_px: f32,
}

impl FontdueFace {
    /// Open a font file and fix its pixel size
    pub fn open(path: &Path, font_size: f32) -> Result<Self, AtlasError> {
        let data = std::fs::read(path).map_err(|e| AtlasError::FontLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(&data, font_size)
    }

    /// Load from font data
    pub fn from_bytes(data: &[u8], font_size: f32) -> Result<Self, AtlasError> {
        let size_px = pixel_size(font_size)? as f32;
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| AtlasError::FontLoad(format!("Failed to load font: {}", e)))?;

        info!("fontdue font loaded ({}px, {} glyphs)", size_px, font.glyph_count());

        Ok(Self { font, size_px })
    }
}

impl GlyphRasterizer for FontdueFace {
    fn rasterize(&self, codepoint: u32) -> Result<RasterGlyph, AtlasError> {
        // Surrogates and out-of-range values have no cmap entry: .notdef
        let (metrics, bitmap) = match char::from_u32(codepoint) {
            Some(ch) => self.font.rasterize(ch, self.size_px),
            None => self.font.rasterize_indexed(0, self.size_px),
        };

        // Pixels -> 26.6 fixed point, same unit FreeType reports
        let advance_x = (metrics.advance_width * 64.0).round() as i64;

        if metrics.width == 0 || metrics.height == 0 {
            return Ok(RasterGlyph {
                bitmap_left: metrics.xmin,
                ..RasterGlyph::blank(advance_x, 0)
            });
        }

        let width = metrics.width as u32;
        let rows = metrics.height as u32;
        if bitmap.len() < metrics.width * metrics.height {
            return Err(AtlasError::Rasterization {
                codepoint,
                reason: format!("bitmap holds {} bytes for {}x{}", bitmap.len(), width, rows),
            });
        }

        Ok(RasterGlyph {
            width,
            rows,
            pitch: metrics.width,
            buffer: bitmap,
            advance_x,
            advance_y: 0,
            bitmap_left: metrics.xmin,
            // ymin is the bottom edge relative to the baseline
            bitmap_top: metrics.ymin + rows as i32,
        })
    }

    fn line_height(&self) -> i32 {
        self.font
            .horizontal_line_metrics(self.size_px)
            .map(|m| m.new_line_size.round() as i32)
            .unwrap_or(self.size_px as i32)
    }
}
