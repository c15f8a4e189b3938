//! # Reticle - Photomask Reticle Layout Generator
//!
//! Reticle turns a set of same-size images (one per layer of a source layout)
//! into stepper-ready photomask reticle layouts. It provides:
//!
//! - **Barcode rendering**: stepper-readable bar/space symbols as rectangles
//! - **Packing**: grid capacity, multi-reticle split and centered slot offsets
//! - **Assembly**: image placement, barcode and text annotations, flattening
//! - **Export**: JSON geometry, SVG and PNG previews
//!
//! ## Quick Start
//!
//! ```
//! use reticle::{
//!     ReticleAssembler, ReticleProfile,
//!     barcode::SymbologyTable,
//!     geometry::{Canvas, Layer, Point, Rect, Size},
//! };
//!
//! // Source layout: one 5×5 µm image per layer
//! let mut source = Canvas::new("source");
//! let layers: Vec<Layer> = (1..=25).map(|l| Layer::new(l, 0)).collect();
//! for &layer in &layers {
//!     source.add_rect(Rect::centered(Point::ORIGIN, Size::new(5000.0, 5000.0)), layer);
//! }
//!
//! let profile = ReticleProfile::ASML300;
//! let table = SymbologyTable::builtin()?;
//! let reticles = ReticleAssembler::new(&profile, table)
//!     .assemble(&source, Size::new(5000.0, 5000.0), &layers, "lot42", "")?;
//!
//! assert_eq!(reticles.len(), 3);
//! assert_eq!(reticles[2].name, "LOT42-R2");
//!
//! # Ok::<(), reticle::ReticleError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`geometry`] | Canvases, shapes, layers and transforms |
//! | [`barcode`] | Symbology table, encoder and bar renderer |
//! | [`packer`] | Grid capacity and slot assignment |
//! | [`assembler`] | Reticle assembly and annotation |
//! | [`config`] | Reticle profiles |
//! | [`export`] | JSON, SVG and PNG output |
//! | [`error`] | Error types |
//!
//! ## Supported Reticles
//!
//! Currently ships with:
//! - ASML PAS 5500/300 (6" reticle, 4× reduction)
//!
//! Other formats can be described with a JSON profile.

pub mod assembler;
pub mod barcode;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod packer;

// Re-exports for convenience
pub use assembler::{Assembly, ReticleAssembler, populate};
pub use config::ReticleProfile;
pub use error::ReticleError;
pub use packer::{Packing, pack};
