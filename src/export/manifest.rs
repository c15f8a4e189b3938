//! Build manifest: which reticle holds which images, and where each was written.
//!
//! ```json
//! {
//!   "generated_at": "2026-10-19T14:03:11+02:00",
//!   "profile": "ASML300",
//!   "image_count": 25,
//!   "grid": { "columns": 3, "rows": 3, "capacity": 9 },
//!   "reticles": [
//!     { "name": "LOT42-R0", "slot_count": 9, "slots": [0, 1, 2, 3, 4, 5, 6, 7, 8],
//!       "files": ["out/LOT42-R0.json"] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use super::ExportFormat;
use crate::assembler::Assembly;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSummary {
    pub columns: usize,
    pub rows: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub slot_count: usize,
    /// Global image indices, row-major.
    pub slots: Vec<usize>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// RFC 3339 local time.
    pub generated_at: String,
    pub profile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub image_count: usize,
    pub grid: GridSummary,
    pub reticles: Vec<ManifestEntry>,
}

impl Manifest {
    pub const FILE_NAME: &'static str = "manifest.json";

    /// Manifest for `assembly`, stamped now, with no files recorded yet.
    pub fn from_assembly(assembly: &Assembly, profile: &str) -> Self {
        let grid = assembly.packing.grid;
        let reticles = assembly
            .reticles
            .iter()
            .zip(&assembly.packing.canvases)
            .map(|(reticle, assignment)| ManifestEntry {
                name: reticle.name.clone(),
                slot_count: assignment.slots.len(),
                slots: assignment.slots.iter().map(|s| s.index).collect(),
                files: Vec::new(),
            })
            .collect();

        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            profile: profile.to_string(),
            source: None,
            image_count: assembly.packing.slot_count(),
            grid: GridSummary {
                columns: grid.n_cols,
                rows: grid.n_rows,
                capacity: grid.capacity(),
            },
            reticles,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Write every reticle of `assembly` in each of `formats` into `dir`,
    /// record the files, then save the manifest itself next to them.
    ///
    /// Returns the manifest path.
    pub fn write_assembly(
        &mut self,
        assembly: &Assembly,
        formats: &[ExportFormat],
        dir: &Path,
    ) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        for (entry, reticle) in self.reticles.iter_mut().zip(&assembly.reticles) {
            for format in formats {
                entry.files.push(format.write(reticle, dir)?);
            }
        }

        let path = dir.join(Self::FILE_NAME);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!(
            "wrote {} reticle(s) and {}",
            self.reticles.len(),
            path.display()
        );
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}
