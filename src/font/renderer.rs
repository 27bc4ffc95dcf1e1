//! Font renderer driver
//!
//! Pairs a rasterizer backend with the atlases built from it and
//! exposes them to text drawing code through [`FontRendererDriver`].

use log::info;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::atlas::{Atlas, AtlasSet, GlyphRecord};
use super::discovery::default_font_path;
use super::error::AtlasError;
use super::fontdue::FontdueFace;
use super::freetype::FtFace;
use super::rasterizer::GlyphRasterizer;

/// Rasterizer backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// FreeType (system library)
    #[default]
    FreeType,
    /// fontdue (pure Rust)
    Fontdue,
}

impl Backend {
    /// Driver identifier
    pub fn ident(self) -> &'static str {
        match self {
            Self::FreeType => "freetype",
            Self::Fontdue => "fontdue",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ident())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "freetype" | "ft" => Ok(Self::FreeType),
            "fontdue" => Ok(Self::Fontdue),
            other => Err(format!("unknown font backend \"{}\" (expected freetype or fontdue)", other)),
        }
    }
}

/// What text drawing code needs from a font
pub trait FontRendererDriver {
    /// Backend identifier ("freetype", "fontdue")
    fn ident(&self) -> &'static str;

    /// All atlases, in codepoint order
    fn atlases(&self) -> &AtlasSet;

    /// First atlas (the only one in the common single-block setup)
    fn atlas(&self) -> Option<&Atlas> {
        self.atlases().atlas(0)
    }

    /// Glyph for `codepoint`, None past the covered range
    fn glyph(&self, codepoint: u32) -> Option<&GlyphRecord> {
        self.atlases().lookup(codepoint)
    }

    /// Baseline-to-baseline distance (pixels)
    fn line_height(&self) -> i32;
}

/// Rasterizer plus the atlases built from it
pub struct FontRenderer<R> {
    face: R,
    atlases: AtlasSet,
    ident: &'static str,
}

impl<R: GlyphRasterizer> FontRenderer<R> {
    /// Build `atlas_count` atlases from `face` and keep both together
    pub fn new(face: R, atlas_count: usize, ident: &'static str) -> Result<Self, AtlasError> {
        let atlases = AtlasSet::build(&face, atlas_count)?;
        Ok(Self { face, atlases, ident })
    }

    /// Underlying rasterizer
    pub fn face(&self) -> &R {
        &self.face
    }
}

impl<R: GlyphRasterizer> FontRendererDriver for FontRenderer<R> {
    fn ident(&self) -> &'static str {
        self.ident
    }

    fn atlases(&self) -> &AtlasSet {
        &self.atlases
    }

    fn line_height(&self) -> i32 {
        self.face.line_height()
    }
}

/// Open a font with `backend` and build its atlases
///
/// Without a path the default font search picks one.
pub fn init(
    backend: Backend,
    font_path: Option<&Path>,
    font_size: f32,
    atlas_count: usize,
) -> Result<Box<dyn FontRendererDriver>, AtlasError> {
    let found;
    let path = match font_path {
        Some(path) => path,
        None => {
            found = default_font_path()
                .ok_or_else(|| AtlasError::FontLoad("no font given and no default font found".to_string()))?;
            found.as_path()
        }
    };

    info!(
        "Font renderer init: {} ({}, {:.1}px, {} atlas(es))",
        path.display(),
        backend,
        font_size,
        atlas_count
    );

    let driver: Box<dyn FontRendererDriver> = match backend {
        Backend::FreeType => Box::new(FontRenderer::new(
            FtFace::open(path, font_size)?,
            atlas_count,
            backend.ident(),
        )?),
        Backend::Fontdue => Box::new(FontRenderer::new(
            FontdueFace::open(path, font_size)?,
            atlas_count,
            backend.ident(),
        )?),
    };
    Ok(driver)
}
