//! # Canvas Export
//!
//! Writes finalized canvases to disk.
//!
//! | Format | Content |
//! |--------|---------|
//! | `json` | Geometry (round-trips through [`Canvas::load`]) |
//! | `svg`  | Vector drawing, one `<g>` per layer, y-up |
//! | `png`  | Grayscale raster preview, labels in a bitmap font |
//!
//! A whole [`Assembly`](crate::Assembly) is written with
//! [`Manifest::write_assembly`], which also records every file in
//! `manifest.json`.
//!
//! ## Usage
//!
//! ```
//! use reticle::export::ExportFormat;
//! use reticle::geometry::{Canvas, Layer, Point, Rect, Size};
//!
//! let mut canvas = Canvas::new("demo");
//! canvas.add_rect(Rect::new(Point::ORIGIN, Size::new(10.0, 10.0)), Layer::new(4, 0));
//!
//! let svg = ExportFormat::Svg.render(&canvas).unwrap();
//! assert!(String::from_utf8(svg).unwrap().starts_with("<svg"));
//! ```

pub mod manifest;
pub mod png;
pub mod svg;

pub use manifest::{GridSummary, Manifest, ManifestEntry};
pub use png::{PreviewOptions, render_png};
pub use svg::render_svg;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ReticleError, Result};
use crate::geometry::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }

    /// Encode `canvas` in this format.
    pub fn render(self, canvas: &Canvas) -> Result<Vec<u8>> {
        match self {
            ExportFormat::Json => Ok(canvas.to_json()?.into_bytes()),
            ExportFormat::Svg => Ok(render_svg(canvas).into_bytes()),
            ExportFormat::Png => render_png(canvas, &PreviewOptions::default()),
        }
    }

    /// Write `canvas` to `dir/{stem}.{ext}` and return the path.
    ///
    /// The stem is [`file_stem`] of the canvas name, so the file always lands
    /// directly inside `dir`.
    pub fn write(self, canvas: &Canvas, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.{}", file_stem(&canvas.name), self.extension()));
        fs::write(&path, self.render(canvas)?)?;
        debug!("wrote {}", path.display());
        Ok(path)
    }
}

/// File name stem for a canvas name.
///
/// Keeps ASCII letters, digits, `-`, `_`, `.` and `+`; anything else (path
/// separators, spaces, `$`, `%`) becomes `_`. A leading `.` is prefixed with
/// `_` so the file is never hidden and never `.` or `..`.
pub fn file_stem(name: &str) -> String {
    let mut stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() || stem.starts_with('.') {
        stem.insert(0, '_');
    }
    stem
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ReticleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            other => Err(ReticleError::InvalidConfig(format!(
                "unknown export format '{}' (expected json, svg or png)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Layer, Point, Rect, Size};

    #[test]
    fn test_parse_format() {
        assert_eq!("SVG".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("gds".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_file_stem_replaces_separators() {
        assert_eq!(file_stem("LOT7-R0"), "LOT7-R0");
        assert_eq!(file_stem("LOT/7-R0"), "LOT_7-R0");
        assert_eq!(file_stem("A\\B C$%-R1"), "A_B_C__-R1");
        assert_eq!(file_stem("../X-R0"), "_.._X-R0");
        assert_eq!(file_stem(".."), "_..");
        assert_eq!(file_stem(""), "_");
    }

    #[test]
    fn test_write_keeps_slashed_names_inside_dir() {
        let dir = std::env::temp_dir().join(format!("reticle-export-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let mut canvas = Canvas::new("../LOT/7-R0");
        canvas.add_rect(Rect::new(Point::ORIGIN, Size::new(1.0, 1.0)), Layer::new(4, 0));
        let path = ExportFormat::Json.write(&canvas, &dir).unwrap();
        assert_eq!(path, dir.join("_.._LOT_7-R0.json"));
        assert_eq!(Canvas::load(&path).unwrap().name, "../LOT/7-R0");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_display_is_extension() {
        assert_eq!(ExportFormat::Png.to_string(), "png");
    }
}
