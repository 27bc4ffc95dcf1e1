//! ftatlas - fixed-grid glyph atlas builder
//!
//! Rasterizes a fixed codepoint range of a scalable font into
//! uniform cells of one or more greyscale atlas bitmaps, with
//! O(1) codepoint lookup for text renderers.

pub mod config;
pub mod export;
pub mod font;
