//! FreeType wrapper
//!
//! Grayscale rendering through `FT_Load_Char` + `FT_RENDER_MODE_NORMAL`.

use freetype::bitmap::PixelMode;
use freetype::face::LoadFlag;
use freetype::render_mode::RenderMode;
use freetype::Library;
use log::info;
use std::path::Path;

use super::error::AtlasError;
use super::rasterizer::{pixel_size, GlyphRasterizer, RasterGlyph};

/// FreeType face with a fixed pixel size
pub struct FtFace {
    face: freetype::Face,
    // Kept alive for the face; freetype-rs reference-counts the library
    _library: Library,
    /// Current font size (pixels)
    size_px: u32,
}

impl FtFace {
    /// Open a font file and fix its pixel size
    pub fn open(path: &Path, font_size: f32) -> Result<Self, AtlasError> {
        let library =
            Library::init().map_err(|e| AtlasError::FontLoad(format!("FreeType initialization failed: {:?}", e)))?;

        let face = library
            .new_face(path.as_os_str(), 0)
            .map_err(|e| AtlasError::FontLoad(format!("{}: {:?}", path.display(), e)))?;

        Self::with_face(library, face, font_size)
    }

    /// Load from font data
    pub fn from_bytes(data: &[u8], font_size: f32) -> Result<Self, AtlasError> {
        let library =
            Library::init().map_err(|e| AtlasError::FontLoad(format!("FreeType initialization failed: {:?}", e)))?;

        // freetype-rs requires Rc<Vec<u8>>
        let face = library
            .new_memory_face(std::rc::Rc::new(data.to_vec()), 0)
            .map_err(|e| AtlasError::FontLoad(format!("FreeType font loading failed: {:?}", e)))?;

        Self::with_face(library, face, font_size)
    }

    fn with_face(library: Library, face: freetype::Face, font_size: f32) -> Result<Self, AtlasError> {
        let size_px = pixel_size(font_size)?;
        face.set_pixel_sizes(0, size_px)
            .map_err(|e| AtlasError::PixelSize(font_size, format!("{:?}", e)))?;

        let family = face.family_name().unwrap_or_else(|| "unknown".to_string());
        info!("FreeType font loaded: {} ({}px)", family, size_px);

        Ok(Self {
            face,
            _library: library,
            size_px,
        })
    }

    /// Get current size
    pub fn size(&self) -> u32 {
        self.size_px
    }
}

impl GlyphRasterizer for FtFace {
    fn rasterize(&self, codepoint: u32) -> Result<RasterGlyph, AtlasError> {
        let fail = |e: freetype::Error| AtlasError::Rasterization {
            codepoint,
            reason: format!("{:?}", e),
        };

        self.face
            .load_char(codepoint as usize, LoadFlag::RENDER | LoadFlag::NO_BITMAP)
            .map_err(fail)?;

        let glyph = self.face.glyph();
        glyph.render_glyph(RenderMode::Normal).map_err(fail)?;

        let bitmap = glyph.bitmap();
        let advance = glyph.advance();
        let width = bitmap.width().max(0) as u32;
        let rows = bitmap.rows().max(0) as u32;

        if width == 0 || rows == 0 {
            // Empty glyph (e.g., space); keep whatever extent FreeType reports
            return Ok(RasterGlyph {
                width,
                rows,
                bitmap_left: glyph.bitmap_left(),
                bitmap_top: glyph.bitmap_top(),
                ..RasterGlyph::blank(advance.x as i64, advance.y as i64)
            });
        }

        let mode = bitmap.pixel_mode().map_err(fail)?;
        require_gray(mode, codepoint)?;

        // The slot is reused by the next load, copy the rows out with their pitch
        let pitch = bitmap.pitch().unsigned_abs() as usize;
        let src = bitmap.buffer();
        let len = (pitch * rows as usize).min(src.len());
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|e| AtlasError::Allocation(format!("glyph U+{:04X} bitmap: {}", codepoint, e)))?;
        buffer.extend_from_slice(&src[..len]);

        Ok(RasterGlyph {
            width,
            rows,
            pitch,
            buffer,
            advance_x: advance.x as i64,
            advance_y: advance.y as i64,
            bitmap_left: glyph.bitmap_left(),
            bitmap_top: glyph.bitmap_top(),
        })
    }

    fn line_height(&self) -> i32 {
        self.face
            .size_metrics()
            .map(|m| (m.height / 64) as i32)
            .unwrap_or(0)
    }
}

/// Only 8-bit coverage can be blitted into the atlas
fn require_gray(mode: PixelMode, codepoint: u32) -> Result<(), AtlasError> {
    match mode {
        PixelMode::Gray => Ok(()),
        other => Err(AtlasError::Rasterization {
            codepoint,
            reason: format!("unsupported pixel mode {:?} (expected 8-bit gray)", other),
        }),
    }
}
