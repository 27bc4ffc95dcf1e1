//! Font loading and glyph atlas construction
//!
//! Handles:
//! - TTF/OTF font loading (freetype / fontdue)
//! - Fixed-grid glyph atlas generation
//! - Default font discovery
//! - Text layout over the atlas glyph table

pub mod atlas;
pub mod discovery;
pub mod error;
pub mod fontdue;
pub mod freetype;
pub mod layout;
pub mod rasterizer;
pub mod renderer;

pub use self::atlas::{Atlas, AtlasSet, GlyphRecord, ATLAS_COLS, ATLAS_ROWS, ATLAS_SIZE};
pub use self::discovery::default_font_path;
pub use self::error::AtlasError;
pub use self::fontdue::FontdueFace;
pub use self::freetype::FtFace;
pub use self::layout::{layout_text, GlyphQuad, TextLayout};
pub use self::rasterizer::{GlyphRasterizer, RasterGlyph};
pub use self::renderer::{init, Backend, FontRenderer, FontRendererDriver};
