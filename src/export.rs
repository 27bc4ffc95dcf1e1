//! Atlas export
//!
//! Writes each atlas as an 8-bit greyscale PNG and the glyph table
//! as TOML, for texture pipelines that load them offline.

use anyhow::{bail, Context, Result};
use log::info;
use serde::Serialize;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::font::{Atlas, AtlasSet, GlyphRecord, ATLAS_SIZE};

#[derive(Serialize)]
struct MetricsFile {
    atlas: Vec<AtlasMetrics>,
}

#[derive(Serialize)]
struct AtlasMetrics {
    index: usize,
    image: String,
    width: u32,
    height: u32,
    cell_width: u32,
    cell_height: u32,
    glyph: Vec<GlyphEntry>,
}

#[derive(Serialize)]
struct GlyphEntry {
    codepoint: u32,
    #[serde(flatten)]
    record: GlyphRecord,
}

/// File name used for atlas `index`
pub fn image_name(index: usize) -> String {
    format!("atlas_{}.png", index)
}

/// Save one atlas as a greyscale PNG
pub fn write_png(atlas: &Atlas, path: &Path) -> Result<()> {
    if atlas.width() == 0 || atlas.height() == 0 {
        bail!("atlas has no ink to export ({}x{})", atlas.width(), atlas.height());
    }

    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), atlas.width(), atlas.height());
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(atlas.buffer())?;
    writer.finish()?;

    info!("Atlas saved: {} ({}x{})", path.display(), atlas.width(), atlas.height());
    Ok(())
}

/// Render the glyph table of every atlas as TOML
pub fn metrics_toml(set: &AtlasSet) -> Result<String> {
    let file = MetricsFile {
        atlas: set
            .atlases()
            .iter()
            .enumerate()
            .map(|(index, atlas)| AtlasMetrics {
                index,
                image: image_name(index),
                width: atlas.width(),
                height: atlas.height(),
                cell_width: atlas.cell_width(),
                cell_height: atlas.cell_height(),
                glyph: atlas
                    .glyphs()
                    .iter()
                    .enumerate()
                    .map(|(i, record)| GlyphEntry {
                        codepoint: (index * ATLAS_SIZE + i) as u32,
                        record: *record,
                    })
                    .collect(),
            })
            .collect(),
    };
    toml::to_string(&file).context("Failed to serialize glyph metrics")
}

/// Save the glyph table of every atlas
pub fn write_metrics(set: &AtlasSet, path: &Path) -> Result<()> {
    let content = metrics_toml(set)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Metrics saved: {}", path.display());
    Ok(())
}

/// Save every atlas (and optionally metrics.toml) into `dir`
///
/// Returns the written files.
pub fn export_all(set: &AtlasSet, dir: &Path, metrics: bool) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for (index, atlas) in set.atlases().iter().enumerate() {
        let path = dir.join(image_name(index));
        write_png(atlas, &path)?;
        written.push(path);
    }
    if metrics {
        let path = dir.join("metrics.toml");
        write_metrics(set, &path)?;
        written.push(path);
    }
    Ok(written)
}
