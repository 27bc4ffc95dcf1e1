//! Default font lookup
//!
//! Search order:
//! 1. FTATLAS_FONT environment variable
//! 2. Known per-platform paths (hardcoded)
//! 3. `osd-font.ttf` next to the working directory (bundled with distributions)

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Environment variable naming a font file to use instead of probing
pub const FONT_ENV: &str = "FTATLAS_FONT";

/// Font shipped alongside packaged builds, tried last
pub const BUNDLED_FONT: &str = "osd-font.ttf";

#[cfg(target_os = "windows")]
const CANDIDATES: &[&str] = &["C:\\Windows\\Fonts\\consola.ttf", "C:\\Windows\\Fonts\\verdana.ttf"];

#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &[
    "/Library/Fonts/Microsoft/Candara.ttf",
    "/Library/Fonts/Verdana.ttf",
    "/Library/Fonts/Tahoma.ttf",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/ttf-dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/ttf-dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/Vera.ttf",
    "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
];

/// Candidate paths in search order (platform list, then the bundled font)
pub fn candidates() -> impl Iterator<Item = &'static str> {
    CANDIDATES.iter().copied().chain(std::iter::once(BUNDLED_FONT))
}

/// First existing font file, or None
pub fn default_font_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(FONT_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            info!("Font selected: {} ({})", path.display(), FONT_ENV);
            return Some(path);
        }
        warn!("{} points to a missing file: {}", FONT_ENV, path.display());
    }

    let found = first_existing(candidates());
    match &found {
        Some(path) => info!("Font selected: {}", path.display()),
        None => debug!("No default font found"),
    }
    found
}

/// First path of `paths` that is an existing file
pub fn first_existing<'a>(paths: impl IntoIterator<Item = &'a str>) -> Option<PathBuf> {
    paths.into_iter().map(Path::new).find(|p| p.is_file()).map(Path::to_path_buf)
}
