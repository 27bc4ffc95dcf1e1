//! Atlas construction errors

use thiserror::Error;

/// Errors surfaced while opening a font or building its atlases
///
/// Every variant is terminal for the call that produced it:
/// no partially built atlas is ever returned.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Font resource could not be opened or parsed
    #[error("font load failed: {0}")]
    FontLoad(String),

    /// Requested pixel size rejected by the rasterizer
    #[error("pixel size {0} rejected: {1}")]
    PixelSize(f32, String),

    /// A codepoint in range could not be loaded or rendered
    #[error("rasterization failed for U+{codepoint:04X}: {reason}")]
    Rasterization { codepoint: u32, reason: String },

    /// Buffer allocation failed (or the requested geometry overflows)
    #[error("allocation failed: {0}")]
    Allocation(String),
}
