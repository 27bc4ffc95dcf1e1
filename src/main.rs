//! ftatlas - build fixed-grid glyph atlases from a font
//!
//! Reads ~/.config/ftatlas/config.toml, applies command line
//! overrides, builds the atlases and exports PNG + metrics.

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use std::path::PathBuf;

use ftatlas::config::Config;
use ftatlas::export;
use ftatlas::font::{self, default_font_path, layout_text, Backend, ATLAS_SIZE};

fn print_help() {
    println!(
        r#"ftatlas {} - fixed-grid glyph atlas builder

USAGE:
    ftatlas [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --font PATH             Font file (default: config, then well-known paths)
    --size PX               Pixel size (default: 16)
    --backend NAME          Rasterizer: freetype | fontdue
    --atlases N             Number of {}-codepoint atlases (default: 1)
    --out DIR               Output directory (default: .)
    --no-metrics            Skip metrics.toml
    --print-default-font    Print the default font path and exit
    --measure TEXT          Print the laid out size of TEXT and exit

ENVIRONMENT:
    FTATLAS_FONT            Font file tried before the well-known paths
    RUST_LOG                Log filter (default: warn)

CONFIG FILE:
    ~/.config/ftatlas/config.toml
"#,
        env!("CARGO_PKG_VERSION"),
        ATLAS_SIZE
    );
}

/// Value following a flag
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .map(|v| Some(v.as_str()))
            .ok_or_else(|| anyhow!("{} requires a value", flag)),
        None => Ok(None),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("ftatlas {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.iter().any(|a| a == "--print-default-font") {
        match default_font_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("no default font found"),
        }
        return Ok(());
    }

    let mut config = Config::load();

    // Command line overrides config
    if let Some(path) = flag_value(&args, "--font")? {
        config.font.path = path.to_string();
    }
    if let Some(size) = flag_value(&args, "--size")? {
        config.font.size = size.parse().with_context(|| format!("invalid --size: {}", size))?;
    }
    if let Some(backend) = flag_value(&args, "--backend")? {
        config.font.backend = backend.to_string();
    }
    if let Some(count) = flag_value(&args, "--atlases")? {
        config.font.atlas_count = count.parse().with_context(|| format!("invalid --atlases: {}", count))?;
    }
    if let Some(dir) = flag_value(&args, "--out")? {
        config.export.dir = dir.to_string();
    }
    if args.iter().any(|a| a == "--no-metrics") {
        config.export.metrics = false;
    }

    let backend: Backend = config.font.backend()?;
    let font_path: Option<PathBuf> = config.font.font_path();

    let driver = font::init(backend, font_path.as_deref(), config.font.size, config.font.atlas_count)
        .context("Failed to build glyph atlas")?;

    if let Some(text) = flag_value(&args, "--measure")? {
        let layout = layout_text(driver.as_ref(), text, 1.0);
        println!(
            "{}x{} ({} glyphs, line height {})",
            layout.width,
            layout.height,
            layout.quads.len(),
            driver.line_height()
        );
        return Ok(());
    }

    let written = export::export_all(driver.atlases(), &config.export.dir(), config.export.metrics)?;
    for path in &written {
        println!("{}", path.display());
    }

    info!("Done: {} file(s) written by {}", written.len(), driver.ident());
    Ok(())
}
