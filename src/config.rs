//! # Reticle Profiles
//!
//! This module defines the fixed constants of a reticle format: usable area,
//! reduction scale, minimum clearance, and where the barcode and text
//! annotations go.
//!
//! ## Built-in Profiles
//!
//! | Profile | Usable area | Scale | Clearance | Layer |
//! |---------|-------------|-------|-----------|-------|
//! | ASML300 | 88 × 88 mm | 4× | 4 mm | 4/0 |
//!
//! ## Usage
//!
//! ```
//! use reticle::config::ReticleProfile;
//!
//! let profile = ReticleProfile::ASML300;
//! assert_eq!(profile.normalize_id("lot42-wafer-a"), "LOT42-WA");
//! assert_eq!(ReticleProfile::reticle_name("LOT42-WA", 1), "LOT42-WA-R1");
//! ```
//!
//! Profiles can be overridden from JSON; omitted fields keep the ASML300
//! values:
//!
//! ```json
//! { "name": "ASML300 narrow", "clearance": 6000, "barcode": { "height": 4000 } }
//! ```

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::barcode::{BarMetrics, DEFAULT_MAX_LENGTH};
use crate::error::Result;
use crate::geometry::{Layer, Point, Rotation, Size};
use crate::packer::{self, Packing};

/// # Barcode Placement
///
/// The barcode is rendered with its leading quiet zone at the local origin,
/// then rotated about the origin and moved to `anchor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodePlacement {
    pub anchor: Point,
    pub height: f64,
    pub rotation: Rotation,
    /// Characters encoded before filtering.
    pub max_length: usize,
    pub metrics: BarMetrics,
}

impl Default for BarcodePlacement {
    fn default() -> Self {
        ReticleProfile::ASML300.barcode
    }
}

/// # Reticle Profile
///
/// All lengths are at reticle scale (nm for ASML300). Image sizes handed to
/// the assembler are at wafer scale and get multiplied by `scale`.
///
/// ## Annotation Layout (ASML300)
///
/// ```text
///  ┌──────────────────────────────────────────┐
///  │ text ↑                          barcode ↓│
///  │ (-69500, 37500)            (69000, 53300)│
///  │                                          │
///  │              image grid                  │
///  │             centered on 0,0              │
///  │ id ↑                                     │
///  │ (-69500, -37500)                         │
///  └──────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReticleProfile {
    pub name: Cow<'static, str>,
    /// Area available for images.
    pub available_size: Size,
    /// Reticle scale = `scale` × wafer scale.
    pub scale: f64,
    /// Minimum space between neighbouring images.
    pub clearance: f64,
    /// Layer receiving images, barcode and text.
    pub geometry_layer: Layer,
    pub barcode: BarcodePlacement,
    pub text_height: f64,
    /// Center of the reticle identifier label.
    pub id_anchor: Point,
    /// Center of the free annotation label.
    pub text_anchor: Point,
    pub text_rotation: Rotation,
    pub id_max_len: usize,
    pub text_max_len: usize,
}

impl ReticleProfile {
    /// # ASML PAS 5500/300 reticle
    ///
    /// 6" reticle, 4× reduction, barcode read by the stepper on the right edge.
    pub const ASML300: Self = Self {
        name: Cow::Borrowed("ASML300"),
        available_size: Size::new(88000.0, 88000.0),
        scale: 4.0,
        clearance: 4000.0,
        geometry_layer: Layer::new(4, 0),
        barcode: BarcodePlacement {
            anchor: Point::new(69000.0, 53300.0),
            height: 5000.0,
            rotation: Rotation::R270,
            max_length: DEFAULT_MAX_LENGTH,
            metrics: BarMetrics::ASML300,
        },
        text_height: 2500.0,
        id_anchor: Point::new(-69500.0, -37500.0),
        text_anchor: Point::new(-69500.0, 37500.0),
        text_rotation: Rotation::R90,
        id_max_len: 8,
        text_max_len: 12,
    };

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Resolve a profile argument: a built-in name (case-insensitive) or a
    /// path to a JSON profile.
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(profile) = Self::built_in()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(s))
        {
            return Ok(profile);
        }
        Self::from_json_file(Path::new(s))
    }

    pub fn built_in() -> Vec<Self> {
        vec![Self::ASML300]
    }

    /// Truncated, uppercased reticle identifier.
    pub fn normalize_id(&self, id: &str) -> String {
        truncate_upper(id, self.id_max_len)
    }

    /// Truncated, uppercased annotation text.
    pub fn normalize_text(&self, text: &str) -> String {
        truncate_upper(text, self.text_max_len)
    }

    /// Per-canvas identifier, also used as barcode text and canvas name.
    pub fn reticle_name(id: &str, index: usize) -> String {
        format!("{}-R{}", id, index)
    }

    /// Pack `image_count` images of `image_size` (wafer scale) with this
    /// profile's area, scale and clearance.
    pub fn pack(&self, image_size: Size, image_count: usize) -> Result<Packing> {
        packer::pack(
            self.available_size,
            self.scale,
            self.clearance,
            image_count,
            image_size,
        )
    }
}

impl Default for ReticleProfile {
    fn default() -> Self {
        Self::ASML300
    }
}

fn truncate_upper(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect::<String>().to_uppercase()
}

// ============================================================================
// TESTS
// ============================================================================
