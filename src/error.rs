//! # Error Types
//!
//! This module defines error types used throughout the reticle library.

use thiserror::Error;

use crate::barcode::SymbologyError;

/// Main error type for reticle operations
#[derive(Debug, Error)]
pub enum ReticleError {
    /// Non-positive or non-finite canvas size, scale, clearance or slot size
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A single slot footprint does not fit on the canvas
    #[error(
        "Slot footprint {footprint_x}x{footprint_y} does not fit in canvas {canvas_x}x{canvas_y}"
    )]
    SlotExceedsCanvas {
        footprint_x: f64,
        footprint_y: f64,
        canvas_x: f64,
        canvas_y: f64,
    },

    /// Rotation that is not a multiple of 90 degrees
    #[error("Invalid rotation: {0} degrees (only multiples of 90 are supported)")]
    InvalidRotation(i32),

    /// Malformed `layer/datatype` string
    #[error("Invalid layer: {0}")]
    InvalidLayer(String),

    /// Malformed symbology table
    #[error("Symbology error: {0}")]
    Symbology(#[from] SymbologyError),

    /// Geometry file that cannot be parsed
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Preview rendering error
    #[error("Preview error: {0}")]
    Preview(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ReticleError>;
