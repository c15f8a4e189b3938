//! # Reticle Packer
//!
//! Computes how many same-size image slots fit on a reticle canvas, splits a
//! slot list across as many canvases as needed, and gives each slot a
//! translation relative to the canvas center.
//!
//! ## Grid
//!
//! ```text
//! pitch  = scale * slot_size + clearance
//! n_cols = floor((canvas_width  + clearance) / pitch_x)
//! n_rows = floor((canvas_height + clearance) / pitch_y)
//! ```
//!
//! The `+ clearance` in the numerator accounts for the last slot of a row
//! not needing clearance past the canvas edge.
//!
//! ## Assignment
//!
//! Row-major within a canvas, canvas-major overall:
//!
//! ```text
//! canvas = i / capacity
//! row    = (i % capacity) / n_cols
//! col    = (i % capacity) % n_cols
//! ```
//!
//! ## Centering
//!
//! Offsets center the *full-capacity* grid on the canvas origin. A partially
//! filled last canvas keeps the same cell positions as a full one; empty cells
//! are simply left out.

use log::info;
use serde::Serialize;

use crate::error::{ReticleError, Result};
use crate::geometry::{Point, Size};

/// Grid geometry shared by every canvas of one packing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grid {
    pub n_cols: usize,
    pub n_rows: usize,
    /// Center-to-center slot spacing, clearance included.
    pub pitch: Size,
    capacity: usize,
}

impl Grid {
    /// Validate the inputs and compute the per-canvas grid.
    ///
    /// Fails if any dimension, the scale or the clearance is not strictly
    /// positive, or if not even one slot fits.
    pub fn new(canvas_size: Size, scale: f64, clearance: f64, slot_size: Size) -> Result<Grid> {
        if !canvas_size.is_positive() {
            return Err(ReticleError::InvalidConfig(format!(
                "canvas size must be positive, got {}x{}",
                canvas_size.width, canvas_size.height
            )));
        }
        require_positive("scale", scale)?;
        require_positive("clearance", clearance)?;
        if !slot_size.is_positive() {
            return Err(ReticleError::InvalidConfig(format!(
                "slot size must be positive, got {}x{}",
                slot_size.width, slot_size.height
            )));
        }

        let pitch = Size::new(
            scale * slot_size.width + clearance,
            scale * slot_size.height + clearance,
        );
        let n_cols = grid_count("columns", (canvas_size.width + clearance) / pitch.width)?;
        let n_rows = grid_count("rows", (canvas_size.height + clearance) / pitch.height)?;

        if n_cols == 0 || n_rows == 0 {
            return Err(ReticleError::SlotExceedsCanvas {
                footprint_x: scale * slot_size.width,
                footprint_y: scale * slot_size.height,
                canvas_x: canvas_size.width,
                canvas_y: canvas_size.height,
            });
        }

        let capacity = n_cols.checked_mul(n_rows).ok_or_else(|| {
            ReticleError::InvalidConfig(format!(
                "grid of {} x {} slots per canvas is too large",
                n_cols, n_rows
            ))
        })?;

        Ok(Grid {
            n_cols,
            n_rows,
            pitch,
            capacity,
        })
    }

    /// Slots per canvas.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Canvases needed for `slot_count` slots.
    pub fn canvases_for(&self, slot_count: usize) -> usize {
        slot_count.div_ceil(self.capacity())
    }

    /// Translation of cell `(row, col)` relative to the canvas center.
    pub fn offset(&self, row: usize, col: usize) -> Point {
        Point::new(
            col as f64 * self.pitch.width - 0.5 * (self.n_cols as f64 - 1.0) * self.pitch.width,
            row as f64 * self.pitch.height - 0.5 * (self.n_rows as f64 - 1.0) * self.pitch.height,
        )
    }

    /// Placement of global slot `index`.
    pub fn locate(&self, index: usize) -> Slot {
        let capacity = self.capacity();
        let local = index % capacity;
        let row = local / self.n_cols;
        let col = local % self.n_cols;
        Slot {
            index,
            canvas: index / capacity,
            row,
            col,
            offset: self.offset(row, col),
        }
    }
}

/// Floor of a slot count, rejecting counts that do not fit in `usize`.
fn grid_count(axis: &str, ratio: f64) -> Result<usize> {
    if ratio.is_finite() && ratio < usize::MAX as f64 {
        Ok(ratio.floor() as usize)
    } else {
        Err(ReticleError::InvalidConfig(format!(
            "too many {} per canvas ({})",
            axis, ratio
        )))
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ReticleError::InvalidConfig(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

/// One image placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Slot {
    /// Global slot (image) index.
    pub index: usize,
    pub canvas: usize,
    pub row: usize,
    pub col: usize,
    pub offset: Point,
}

/// The slots landing on one canvas, in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasAssignment {
    pub index: usize,
    pub slots: Vec<Slot>,
}

impl CanvasAssignment {
    /// Global slot index occupying `(row, col)`, if any.
    pub fn slot_at(&self, row: usize, col: usize) -> Option<usize> {
        self.slots
            .iter()
            .find(|s| s.row == row && s.col == col)
            .map(|s| s.index)
    }
}

/// Result of [`pack`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packing {
    pub grid: Grid,
    pub canvases: Vec<CanvasAssignment>,
}

impl Packing {
    pub fn slot_count(&self) -> usize {
        self.canvases.iter().map(|c| c.slots.len()).sum()
    }

    pub fn canvas_count(&self) -> usize {
        self.canvases.len()
    }
}

/// Split `slot_count` slots of `slot_size` (image scale) over canvases of
/// `canvas_size` (canvas scale).
///
/// Zero slots is a valid request and yields zero canvases; invalid
/// parameters fail before anything is assigned.
pub fn pack(
    canvas_size: Size,
    scale: f64,
    clearance: f64,
    slot_count: usize,
    slot_size: Size,
) -> Result<Packing> {
    let grid = Grid::new(canvas_size, scale, clearance, slot_size)?;
    let n_canvases = grid.canvases_for(slot_count);

    let capacity = grid.capacity();
    let mut canvases: Vec<CanvasAssignment> = (0..n_canvases)
        .map(|index| CanvasAssignment {
            index,
            slots: Vec::with_capacity(capacity.min(slot_count - index * capacity)),
        })
        .collect();
    for index in 0..slot_count {
        let slot = grid.locate(index);
        canvases[slot.canvas].slots.push(slot);
    }

    info!(
        "packed {} slots into {} canvas(es) of {}x{} (pitch {}x{})",
        slot_count, n_canvases, grid.n_cols, grid.n_rows, grid.pitch.width, grid.pitch.height
    );

    Ok(Packing { grid, canvases })
}
