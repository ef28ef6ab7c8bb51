//! Font loading and caching.
//!
//! Fonts resolve from `FONT_DIR` (default `assets/fonts` under the project
//! root) first, then from the usual system locations, so a deployment can
//! ship its own Arial-compatible set while bare machines still render.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rusttype::Font;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {0}: {1}")]
    Read(String, std::io::Error),
    #[error("failed to parse font {0}")]
    Parse(String),
    #[error("no usable font found (searched FONT_DIR and system font dirs)")]
    NotFound,
}

static FONT_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<Font<'static>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn font_dir() -> PathBuf {
    if let Ok(p) = std::env::var("FONT_DIR") {
        return PathBuf::from(p);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("fonts")
}

fn system_font_dirs() -> Vec<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu",
        "/usr/share/fonts/truetype/liberation",
        "/usr/share/fonts/truetype/msttcorefonts",
        "/usr/share/fonts/TTF",
        "/usr/share/fonts/dejavu",
        "/usr/local/share/fonts",
        "/System/Library/Fonts/Supplemental",
        "/Library/Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

pub fn load_font_cached(path: &PathBuf) -> Result<Arc<Font<'static>>, FontError> {
    if let Some(f) = FONT_CACHE.lock().get(path) {
        return Ok(Arc::clone(f));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| FontError::Read(path.display().to_string(), e))?;
    let f = Font::try_from_vec(bytes)
        .ok_or_else(|| FontError::Parse(path.display().to_string()))?;

    let f = Arc::new(f);
    FONT_CACHE.lock().insert(path.clone(), Arc::clone(&f));
    Ok(f)
}

fn load_first(candidates: &[&str]) -> Option<Arc<Font<'static>>> {
    let mut dirs = vec![font_dir()];
    dirs.extend(system_font_dirs());
    for dir in &dirs {
        for name in candidates {
            let path = dir.join(name);
            if path.is_file() {
                if let Ok(f) = load_font_cached(&path) {
                    return Some(f);
                }
            }
        }
    }
    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// The three faces the watermark layouts use. Bold/italic quietly fall back
/// to the regular face when only that one is installed.
#[derive(Clone)]
pub struct FontBook {
    regular: Arc<Font<'static>>,
    bold: Arc<Font<'static>>,
    italic: Arc<Font<'static>>,
}

const REGULAR_CANDIDATES: &[&str] = &[
    "Arial.ttf",
    "arial.ttf",
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "NotoSans-Regular.ttf",
];
const BOLD_CANDIDATES: &[&str] = &[
    "Arial Bold.ttf",
    "Arial-Bold.ttf",
    "arialbd.ttf",
    "DejaVuSans-Bold.ttf",
    "LiberationSans-Bold.ttf",
    "NotoSans-Bold.ttf",
];
const ITALIC_CANDIDATES: &[&str] = &[
    "Arial Italic.ttf",
    "Arial-Italic.ttf",
    "ariali.ttf",
    "DejaVuSans-Oblique.ttf",
    "LiberationSans-Italic.ttf",
    "NotoSans-Italic.ttf",
];

impl FontBook {
    pub fn load() -> Result<Self, FontError> {
        let regular = load_first(REGULAR_CANDIDATES).ok_or(FontError::NotFound)?;
        let bold = load_first(BOLD_CANDIDATES).unwrap_or_else(|| Arc::clone(&regular));
        let italic = load_first(ITALIC_CANDIDATES).unwrap_or_else(|| Arc::clone(&regular));
        Ok(Self { regular, bold, italic })
    }

    pub fn get(&self, style: FontStyle) -> &Font<'static> {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_font_book() -> Option<FontBook> {
    match FontBook::load() {
        Ok(b) => Some(b),
        Err(_) => {
            eprintln!("no system font available; skipping raster assertions");
            None
        }
    }
}
