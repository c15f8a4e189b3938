//! # Layout Geometry
//!
//! Minimal layout toolkit used by the barcode renderer, the packer and the
//! reticle assembler.
//!
//! ## Model
//!
//! ```text
//! Canvas ─┬─ Element { layer, Rect | Polygon | Label }   (leaf geometry)
//!         └─ Reference { Canvas, Transform }             (placed sub-canvas)
//! ```
//!
//! A canvas is *flat* when it has no references left. Flattening bakes each
//! reference transform into copies of the referenced geometry, so finished
//! reticles are plain lists of leaf shapes.
//!
//! ## Units
//!
//! All coordinates are `f64` layout units. The built-in ASML300 profile
//! works in nanometres at reticle scale.
//!
//! ## Example
//!
//! ```
//! use reticle::geometry::{Canvas, Layer, Point, Rect, Rotation, Size};
//!
//! let mut bar = Canvas::new("bar");
//! bar.add_rect(Rect::new(Point::new(0.0, -50.0), Size::new(20.0, 100.0)), Layer::new(4, 0));
//!
//! let mut top = Canvas::new("top");
//! top.insert(bar).rotate(Rotation::R90).translate(Point::new(1000.0, 0.0));
//! top.flatten();
//!
//! assert!(top.is_flat());
//! assert_eq!(top.elements.len(), 1);
//! ```

mod canvas;
mod shape;
mod transform;

pub use canvas::{BoundingBox, Canvas, Reference};
pub use shape::{Element, Justify, Label, Polygon, Rect, Shape};
pub use transform::{Rotation, Transform};

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReticleError;

/// A 2D point (or displacement) in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Width and height in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions strictly positive and finite.
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<(f64, f64)> for Size {
    fn from((width, height): (f64, f64)) -> Self {
        Size::new(width, height)
    }
}

/// Parses `"WIDTHxHEIGHT"`, e.g. `"5000x5000"`.
impl FromStr for Size {
    type Err = ReticleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| ReticleError::InvalidConfig(format!("Invalid size '{}', expected WxH", s)))?;
        let width: f64 = w
            .trim()
            .parse()
            .map_err(|_| ReticleError::InvalidConfig(format!("Invalid width: {}", w)))?;
        let height: f64 = h
            .trim()
            .parse()
            .map_err(|_| ReticleError::InvalidConfig(format!("Invalid height: {}", h)))?;
        Ok(Size::new(width, height))
    }
}

/// A GDS-style layer: layer number plus datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Layer {
    pub layer: u16,
    pub datatype: u16,
}

impl Layer {
    #[inline]
    pub const fn new(layer: u16, datatype: u16) -> Self {
        Self { layer, datatype }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer, self.datatype)
    }
}

/// Parses `"4/0"` or a bare layer number `"4"` (datatype 0).
impl FromStr for Layer {
    type Err = ReticleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReticleError::InvalidLayer(s.to_string());
        let s = s.trim();
        match s.split_once('/') {
            Some((layer, datatype)) => Ok(Layer::new(
                layer.trim().parse().map_err(|_| invalid())?,
                datatype.trim().parse().map_err(|_| invalid())?,
            )),
            None => Ok(Layer::new(s.parse().map_err(|_| invalid())?, 0)),
        }
    }
}
