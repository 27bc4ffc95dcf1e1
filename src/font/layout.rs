//! Text layout over the glyph table
//!
//! Turns a string into atlas source rectangles and screen positions,
//! the way a raster font driver walks its glyphs when drawing.

use super::renderer::FontRendererDriver;

/// Codepoint drawn in place of anything the atlases don't cover
pub const FALLBACK_CHAR: char = '?';

/// One glyph to draw: atlas source rect and destination top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Owning atlas index
    pub atlas: usize,
    pub src_x: u32,
    pub src_y: u32,
    /// Source size (pixels, unscaled)
    pub width: u32,
    pub height: u32,
    /// Destination top-left relative to the layout origin (y down)
    pub dst_x: f32,
    pub dst_y: f32,
}

/// Laid out text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub quads: Vec<GlyphQuad>,
    /// Widest line advance
    pub width: f32,
    /// Line count times line height
    pub height: f32,
}

/// Lay out `text` starting at pen (0, 0) on the first baseline
pub fn layout_text(driver: &dyn FontRendererDriver, text: &str, scale: f32) -> TextLayout {
    let atlases = driver.atlases();
    let line_height = driver.line_height() as f32 * scale;

    let mut layout = TextLayout::default();
    let mut pen_x = 0.0f32;
    let mut pen_y = 0.0f32;
    let mut lines = 1u32;

    for ch in text.chars() {
        if ch == '\n' {
            layout.width = layout.width.max(pen_x);
            pen_x = 0.0;
            pen_y += line_height;
            lines += 1;
            continue;
        }

        let Some((atlas, glyph)) = atlases
            .locate(ch as u32)
            .or_else(|| atlases.locate(FALLBACK_CHAR as u32))
        else {
            continue;
        };

        if glyph.width > 0 && glyph.height > 0 {
            layout.quads.push(GlyphQuad {
                atlas,
                src_x: glyph.atlas_offset_x,
                src_y: glyph.atlas_offset_y,
                width: glyph.width,
                height: glyph.height,
                dst_x: pen_x + glyph.draw_offset_x as f32 * scale,
                dst_y: pen_y + glyph.draw_offset_y as f32 * scale,
            });
        }

        pen_x += glyph.advance_x as f32 * scale;
        pen_y += glyph.advance_y as f32 * scale;
    }

    layout.width = layout.width.max(pen_x);
    layout.height = lines as f32 * line_height;
    layout
}
