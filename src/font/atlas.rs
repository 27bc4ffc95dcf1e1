//! Glyph atlas
//!
//! Rasterizes a fixed codepoint range eagerly and packs every glyph
//! into a uniform 16x16 grid per 256-codepoint block.
//! Cell size is the largest glyph bitmap of the block, so building
//! is two passes: render and measure, then allocate and blit.

use log::{debug, info};
use serde::Serialize;

use super::error::AtlasError;
use super::rasterizer::{GlyphRasterizer, RasterGlyph};

/// Grid columns per atlas
pub const ATLAS_COLS: usize = 16;
/// Grid rows per atlas
pub const ATLAS_ROWS: usize = 16;
/// Codepoints per atlas
pub const ATLAS_SIZE: usize = ATLAS_COLS * ATLAS_ROWS;

/// Metrics and atlas location for one glyph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GlyphRecord {
    /// Bitmap width (pixels)
    pub width: u32,
    /// Bitmap height (pixels)
    pub height: u32,
    /// Horizontal pen advance (pixels)
    pub advance_x: i32,
    /// Vertical pen advance (pixels)
    pub advance_y: i32,
    /// Pen x to bitmap left edge
    pub draw_offset_x: i32,
    /// Pen y to bitmap top edge (y down, add directly when blitting)
    pub draw_offset_y: i32,
    /// Cell left edge inside the owning atlas
    pub atlas_offset_x: u32,
    /// Cell top edge inside the owning atlas
    pub atlas_offset_y: u32,
}

impl GlyphRecord {
    fn from_raster(glyph: &RasterGlyph, atlas_offset_x: u32, atlas_offset_y: u32) -> Self {
        Self {
            width: glyph.width,
            height: glyph.rows,
            // 26.6 fixed point -> pixels
            advance_x: (glyph.advance_x >> 6) as i32,
            advance_y: (glyph.advance_y >> 6) as i32,
            draw_offset_x: glyph.bitmap_left,
            draw_offset_y: -glyph.bitmap_top,
            atlas_offset_x,
            atlas_offset_y,
        }
    }
}

/// One greyscale bitmap holding `ATLAS_SIZE` glyph cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atlas {
    width: u32,
    height: u32,
    /// 8bpp coverage, `width` bytes per row
    buffer: Vec<u8>,
    /// Indexed by codepoint within the block
    glyphs: Vec<GlyphRecord>,
}

impl Atlas {
    /// Atlas width (pixels)
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Atlas height (pixels)
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel data (R8, row stride == width)
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Glyph table, one record per cell
    pub fn glyphs(&self) -> &[GlyphRecord] {
        &self.glyphs
    }

    /// Cell width shared by every glyph of this atlas
    pub fn cell_width(&self) -> u32 {
        self.width / ATLAS_COLS as u32
    }

    /// Cell height shared by every glyph of this atlas
    pub fn cell_height(&self) -> u32 {
        self.height / ATLAS_ROWS as u32
    }

    /// Render and pack codepoints `[block * ATLAS_SIZE, (block + 1) * ATLAS_SIZE)`
    fn build<R: GlyphRasterizer + ?Sized>(face: &R, block: usize) -> Result<Self, AtlasError> {
        let base = (block * ATLAS_SIZE) as u32;

        // Pass 1: render every glyph of the block, track the largest bitmap
        let mut rendered: Vec<RasterGlyph> = Vec::new();
        rendered
            .try_reserve_exact(ATLAS_SIZE)
            .map_err(|e| AtlasError::Allocation(format!("glyph scratch table: {}", e)))?;

        let mut max_width = 0u32;
        let mut max_height = 0u32;

        for i in 0..ATLAS_SIZE {
            let glyph = render_checked(face, base + i as u32)?;
            max_width = max_width.max(glyph.width);
            max_height = max_height.max(glyph.rows);
            rendered.push(glyph);
        }

        // Pass 2: allocate the atlas from the observed maxima and blit
        let width = max_width
            .checked_mul(ATLAS_COLS as u32)
            .ok_or_else(|| AtlasError::Allocation(format!("atlas width overflow ({}px cells)", max_width)))?;
        let height = max_height
            .checked_mul(ATLAS_ROWS as u32)
            .ok_or_else(|| AtlasError::Allocation(format!("atlas height overflow ({}px cells)", max_height)))?;
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| AtlasError::Allocation(format!("atlas size overflow ({}x{})", width, height)))?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|e| AtlasError::Allocation(format!("atlas buffer {}x{}: {}", width, height, e)))?;
        buffer.resize(len, 0u8);

        let mut glyphs = Vec::new();
        glyphs
            .try_reserve_exact(ATLAS_SIZE)
            .map_err(|e| AtlasError::Allocation(format!("glyph table: {}", e)))?;

        let stride = width as usize;
        for (i, glyph) in rendered.iter().enumerate() {
            let offset_x = (i % ATLAS_COLS) as u32 * max_width;
            let offset_y = (i / ATLAS_COLS) as u32 * max_height;

            blit(&mut buffer, stride, glyph, offset_x as usize, offset_y as usize);
            glyphs.push(GlyphRecord::from_raster(glyph, offset_x, offset_y));
        }

        debug!(
            "Atlas block {} (U+{:04X}..U+{:04X}): {}x{} cells, {}x{} px",
            block,
            base,
            base as usize + ATLAS_SIZE - 1,
            max_width,
            max_height,
            width,
            height
        );

        Ok(Self {
            width,
            height,
            buffer,
            glyphs,
        })
    }
}

/// Render one codepoint and reject bitmaps whose layout doesn't add up
fn render_checked<R: GlyphRasterizer + ?Sized>(face: &R, codepoint: u32) -> Result<RasterGlyph, AtlasError> {
    let glyph = face.rasterize(codepoint)?;

    if glyph.is_empty() {
        return Ok(glyph);
    }

    if glyph.pitch < glyph.width as usize {
        return Err(AtlasError::Rasterization {
            codepoint,
            reason: format!("pitch {} narrower than width {}", glyph.pitch, glyph.width),
        });
    }

    // Last row only needs `width` bytes; padding after it is optional
    let needed = (glyph.rows as usize - 1) * glyph.pitch + glyph.width as usize;
    if glyph.buffer.len() < needed {
        return Err(AtlasError::Rasterization {
            codepoint,
            reason: format!(
                "bitmap holds {} bytes, {}x{} at pitch {} needs {}",
                glyph.buffer.len(),
                glyph.width,
                glyph.rows,
                glyph.pitch,
                needed
            ),
        });
    }

    Ok(glyph)
}

/// Copy `width` bytes per row from the glyph (stepping by its pitch)
/// into the atlas at (x, y) (stepping by the atlas stride)
fn blit(dst: &mut [u8], stride: usize, glyph: &RasterGlyph, x: usize, y: usize) {
    let w = glyph.width as usize;
    if w == 0 {
        return;
    }
    for r in 0..glyph.rows as usize {
        let start = (y + r) * stride + x;
        dst[start..start + w].copy_from_slice(glyph.row(r));
    }
}

/// Every atlas of a font, covering `[0, len() * ATLAS_SIZE)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasSet {
    atlases: Vec<Atlas>,
}

impl AtlasSet {
    /// Rasterize codepoints `[0, atlas_count * ATLAS_SIZE)` and pack them
    ///
    /// The face must already have its pixel size set. Any load or render
    /// failure aborts the whole build; scratch bitmaps are dropped on
    /// every exit path.
    pub fn build<R: GlyphRasterizer + ?Sized>(face: &R, atlas_count: usize) -> Result<Self, AtlasError> {
        // Codepoints are u32
        let max_blocks = (u32::MAX as usize / ATLAS_SIZE) + 1;
        if atlas_count > max_blocks {
            return Err(AtlasError::Allocation(format!(
                "{} atlases exceed the codepoint space ({} max)",
                atlas_count, max_blocks
            )));
        }

        let mut atlases = Vec::new();
        atlases
            .try_reserve_exact(atlas_count)
            .map_err(|e| AtlasError::Allocation(format!("atlas list: {}", e)))?;

        for block in 0..atlas_count {
            atlases.push(Atlas::build(face, block)?);
        }

        let bytes: usize = atlases.iter().map(|a| a.buffer.len()).sum();
        info!(
            "Glyph atlas built: {} atlas(es), {} glyphs, {} bytes",
            atlases.len(),
            atlases.len() * ATLAS_SIZE,
            bytes
        );

        Ok(Self { atlases })
    }

    /// Glyph for `codepoint`, or None past the covered range
    pub fn lookup(&self, codepoint: u32) -> Option<&GlyphRecord> {
        self.locate(codepoint).map(|(_, glyph)| glyph)
    }

    /// Owning atlas index and glyph for `codepoint`
    pub fn locate(&self, codepoint: u32) -> Option<(usize, &GlyphRecord)> {
        let cp = codepoint as usize;
        let index = cp / ATLAS_SIZE;
        let atlas = self.atlases.get(index)?;
        Some((index, &atlas.glyphs[cp % ATLAS_SIZE]))
    }

    /// All atlases in codepoint order
    pub fn atlases(&self) -> &[Atlas] {
        &self.atlases
    }

    /// Atlas covering block `index`
    pub fn atlas(&self, index: usize) -> Option<&Atlas> {
        self.atlases.get(index)
    }

    /// Number of atlases
    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    /// True if no codepoint is covered
    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }

    /// First codepoint past the covered range
    pub fn codepoint_limit(&self) -> u64 {
        (self.atlases.len() * ATLAS_SIZE) as u64
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory face: glyph size from a closure, fill byte derived
    /// from the codepoint, row padding filled with 0xFF
    pub(crate) struct SyntheticFace {
        pub size: fn(u32) -> (u32, u32),
        pub pad: usize,
        pub fail_at: Option<u32>,
    }

    pub(crate) const PAD_BYTE: u8 = 0xFF;

    pub(crate) fn fill_byte(codepoint: u32) -> u8 {
        (codepoint % 254) as u8 + 1
    }

    impl SyntheticFace {
        pub(crate) fn new(size: fn(u32) -> (u32, u32)) -> Self {
            Self {
                size,
                pad: 3,
                fail_at: None,
            }
        }
    }

    impl GlyphRasterizer for SyntheticFace {
        fn rasterize(&self, codepoint: u32) -> Result<RasterGlyph, AtlasError> {
            if self.fail_at == Some(codepoint) {
                return Err(AtlasError::Rasterization {
                    codepoint,
                    reason: "synthetic failure".to_string(),
                });
            }
            let (width, rows) = (self.size)(codepoint);
            let advance_x = (width as i64 + 1) * 64;
            if width == 0 || rows == 0 {
                return Ok(RasterGlyph::blank(advance_x, 0));
            }
            let pitch = width as usize + self.pad;
            let mut buffer = vec![PAD_BYTE; pitch * rows as usize];
            for r in 0..rows as usize {
                buffer[r * pitch..r * pitch + width as usize].fill(fill_byte(codepoint));
            }
            Ok(RasterGlyph {
                width,
                rows,
                pitch,
                buffer,
                advance_x,
                advance_y: 0,
                bitmap_left: 1,
                bitmap_top: rows as i32 - 2,
            })
        }

        fn line_height(&self) -> i32 {
            12
        }
    }

    /// Printable ASCII 6x9, space and controls blank, the rest 4x4
    pub(crate) fn ascii_like(cp: u32) -> (u32, u32) {
        match cp {
            0..=32 => (0, 0),
            33..=126 => (6, 9),
            _ => (4, 4),
        }
    }

    fn cell_pixels(atlas: &Atlas, glyph: &GlyphRecord) -> Vec<u8> {
        let (cw, ch) = (atlas.cell_width() as usize, atlas.cell_height() as usize);
        let mut out = Vec::with_capacity(cw * ch);
        for y in 0..ch {
            let start = (glyph.atlas_offset_y as usize + y) * atlas.width() as usize + glyph.atlas_offset_x as usize;
            out.extend_from_slice(&atlas.buffer()[start..start + cw]);
        }
        out
    }

    #[test]
    fn test_lookup_covers_exact_range() {
        let set = AtlasSet::build(&SyntheticFace::new(ascii_like), 2).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.codepoint_limit(), 512);
        for cp in 0..512 {
            assert!(set.lookup(cp).is_some(), "U+{:04X} missing", cp);
        }
        assert!(set.lookup(512).is_none());
        assert!(set.lookup(u32::MAX).is_none());
    }

    #[test]
    fn test_locate_reports_owning_atlas() {
        let set = AtlasSet::build(&SyntheticFace::new(ascii_like), 2).unwrap();
        let (index, glyph) = set.locate(300).unwrap();
        assert_eq!(index, 1);
        assert_eq!(glyph, set.lookup(300).unwrap());
        assert_eq!(glyph, &set.atlas(1).unwrap().glyphs()[300 - ATLAS_SIZE]);
        assert_eq!(set.locate(65).unwrap().0, 0);
    }

    #[test]
    fn test_glyphs_within_atlas_bounds() {
        let set = AtlasSet::build(&SyntheticFace::new(ascii_like), 2).unwrap();
        for atlas in set.atlases() {
            assert_eq!(atlas.glyphs().len(), ATLAS_SIZE);
            assert_eq!(atlas.buffer().len(), (atlas.width() * atlas.height()) as usize);
            for glyph in atlas.glyphs() {
                assert!(glyph.atlas_offset_x + glyph.width <= atlas.width());
                assert!(glyph.atlas_offset_y + glyph.height <= atlas.height());
            }
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let face = SyntheticFace::new(ascii_like);
        let a = AtlasSet::build(&face, 1).unwrap();
        let b = AtlasSet::build(&face, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_blank_glyph_leaves_cell_clear() {
        let set = AtlasSet::build(&SyntheticFace::new(ascii_like), 1).unwrap();
        let atlas = set.atlas(0).unwrap();

        let space = set.lookup(' ' as u32).unwrap();
        assert_eq!((space.width, space.height), (0, 0));
        assert_eq!(space.advance_x, 1);
        assert!(cell_pixels(atlas, space).iter().all(|&p| p == 0));

        // Neighbours keep their ink
        let bang = set.lookup('!' as u32).unwrap();
        let pixels = cell_pixels(atlas, bang);
        let cw = atlas.cell_width() as usize;
        for y in 0..atlas.cell_height() as usize {
            for x in 0..cw {
                let inked = x < bang.width as usize && y < bang.height as usize;
                let expected = if inked { fill_byte('!' as u32) } else { 0 };
                assert_eq!(pixels[y * cw + x], expected, "'!' cell at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_geometry_follows_largest_glyph() {
        fn one_big(cp: u32) -> (u32, u32) {
            match cp {
                65 => (11, 19),
                66 => (13, 2),
                _ => (5, 7),
            }
        }
        let set = AtlasSet::build(&SyntheticFace::new(one_big), 1).unwrap();
        let atlas = set.atlas(0).unwrap();
        assert_eq!(atlas.width(), 13 * ATLAS_COLS as u32);
        assert_eq!(atlas.height(), 19 * ATLAS_ROWS as u32);
        assert_eq!(atlas.cell_width(), 13);
        assert_eq!(atlas.cell_height(), 19);

        let big = set.lookup(65).unwrap();
        assert_eq!((big.atlas_offset_x, big.atlas_offset_y), (1 * 13, 4 * 19));
    }

    #[test]
    fn test_each_block_sized_independently() {
        fn second_block_wide(cp: u32) -> (u32, u32) {
            if cp >= ATLAS_SIZE as u32 { (9, 3) } else { (2, 2) }
        }
        let set = AtlasSet::build(&SyntheticFace::new(second_block_wide), 2).unwrap();
        assert_eq!(set.atlas(0).unwrap().cell_width(), 2);
        assert_eq!(set.atlas(1).unwrap().cell_width(), 9);
    }

    #[test]
    fn test_blit_copies_width_not_pitch() {
        let face = SyntheticFace {
            pad: 7,
            ..SyntheticFace::new(ascii_like)
        };
        let set = AtlasSet::build(&face, 1).unwrap();
        let atlas = set.atlas(0).unwrap();
        assert!(!atlas.buffer().contains(&PAD_BYTE));

        let glyph = set.lookup('A' as u32).unwrap();
        let stride = atlas.width() as usize;
        for y in 0..glyph.height as usize {
            for x in 0..glyph.width as usize {
                let idx = (glyph.atlas_offset_y as usize + y) * stride + glyph.atlas_offset_x as usize + x;
                assert_eq!(atlas.buffer()[idx], fill_byte('A' as u32));
            }
        }
    }

    #[test]
    fn test_record_metrics() {
        let set = AtlasSet::build(&SyntheticFace::new(ascii_like), 1).unwrap();
        let glyph = set.lookup('A' as u32).unwrap();
        assert_eq!((glyph.width, glyph.height), (6, 9));
        assert_eq!(glyph.advance_x, 7);
        assert_eq!(glyph.advance_y, 0);
        assert_eq!(glyph.draw_offset_x, 1);
        assert_eq!(glyph.draw_offset_y, -7);
        assert_eq!(glyph.atlas_offset_x, ('A' as u32 % 16) * 6);
        assert_eq!(glyph.atlas_offset_y, ('A' as u32 / 16) * 9);
    }

    #[test]
    fn test_rasterization_failure_aborts_build() {
        let face = SyntheticFace {
            fail_at: Some(130),
            ..SyntheticFace::new(ascii_like)
        };
        match AtlasSet::build(&face, 1) {
            Err(AtlasError::Rasterization { codepoint, .. }) => assert_eq!(codepoint, 130),
            other => panic!("expected rasterization error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_bitmap_rejected() {
        struct Truncated;
        impl GlyphRasterizer for Truncated {
            fn rasterize(&self, _codepoint: u32) -> Result<RasterGlyph, AtlasError> {
                Ok(RasterGlyph {
                    width: 4,
                    rows: 4,
                    pitch: 4,
                    buffer: vec![0; 10],
                    ..RasterGlyph::default()
                })
            }
            fn line_height(&self) -> i32 {
                4
            }
        }
        assert!(matches!(
            AtlasSet::build(&Truncated, 1),
            Err(AtlasError::Rasterization { codepoint: 0, .. })
        ));
    }

    /// Inkless glyphs with an arbitrary extent, for geometry limits
    struct Extent {
        wide: u32,
        tall: u32,
    }

    impl GlyphRasterizer for Extent {
        fn rasterize(&self, codepoint: u32) -> Result<RasterGlyph, AtlasError> {
            let (width, rows) = match codepoint {
                0 => (self.wide, 0),
                1 => (0, self.tall),
                _ => (0, 0),
            };
            Ok(RasterGlyph {
                width,
                rows,
                ..RasterGlyph::blank(64, 0)
            })
        }

        fn line_height(&self) -> i32 {
            1
        }
    }

    #[test]
    fn test_inkless_extent_sizes_cells() {
        let set = AtlasSet::build(&Extent { wide: 9, tall: 5 }, 1).unwrap();
        let atlas = set.atlas(0).unwrap();
        assert_eq!((atlas.cell_width(), atlas.cell_height()), (9, 5));
        assert_eq!(set.lookup(0).unwrap().width, 9);
        assert_eq!(set.lookup(1).unwrap().height, 5);
        assert!(atlas.buffer().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_width_overflow_is_allocation_error() {
        match AtlasSet::build(&Extent { wide: 1 << 28, tall: 0 }, 1) {
            Err(AtlasError::Allocation(msg)) => assert!(msg.contains("width overflow"), "{}", msg),
            other => panic!("expected allocation error, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_buffer_is_allocation_error() {
        let face = Extent {
            wide: 1 << 24,
            tall: 1 << 24,
        };
        assert!(matches!(AtlasSet::build(&face, 1), Err(AtlasError::Allocation(_))));
    }

    #[test]
    fn test_too_many_atlases_is_allocation_error() {
        match AtlasSet::build(&SyntheticFace::new(ascii_like), usize::MAX) {
            Err(AtlasError::Allocation(msg)) => assert!(msg.contains("exceed the codepoint space"), "{}", msg),
            other => panic!("expected allocation error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_atlases() {
        let set = AtlasSet::build(&SyntheticFace::new(ascii_like), 0).unwrap();
        assert!(set.is_empty());
        assert!(set.lookup(0).is_none());
    }

    #[test]
    fn test_all_blank_font() {
        let set = AtlasSet::build(&SyntheticFace::new(|_| (0, 0)), 1).unwrap();
        let atlas = set.atlas(0).unwrap();
        assert_eq!((atlas.width(), atlas.height()), (0, 0));
        assert!(atlas.buffer().is_empty());
        assert_eq!(set.lookup(200).unwrap().advance_x, 1);
    }
}
