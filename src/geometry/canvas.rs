//! Canvas container: leaf elements plus transformed sub-canvas references.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Element, Label, Layer, Point, Polygon, Rect, Rotation, Shape, Transform};
use crate::error::{ReticleError, Result};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn from_point(p: Point) -> Self {
        Self { min: p, max: p }
    }

    pub fn include(&mut self, p: Point) {
        self.min = Point::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Point::new(self.max.x.max(p.x), self.max.y.max(p.y));
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

/// A placed copy of another canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub canvas: Canvas,
    #[serde(default)]
    pub transform: Transform,
}

impl Reference {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            transform: Transform::IDENTITY,
        }
    }

    /// Move by `offset`, after any transform already applied.
    pub fn translate(&mut self, offset: Point) -> &mut Self {
        self.transform = self.transform.then(&Transform::translation(offset));
        self
    }

    /// Rotate about the parent origin, after any transform already applied.
    pub fn rotate(&mut self, rotation: Rotation) -> &mut Self {
        self.transform = self.transform.then(&Transform::rotation(rotation));
        self
    }

    /// Scale about the parent origin, after any transform already applied.
    pub fn magnify(&mut self, magnification: f64) -> &mut Self {
        self.transform = self.transform.then(&Transform::magnification(magnification));
        self
    }
}

/// A named geometry container.
///
/// Canvases own their elements and their referenced sub-canvases outright;
/// inserting a canvas moves it in, so source geometry handed to
/// [`Canvas::extract`] is never mutated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Canvas {
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

impl Canvas {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn add(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn add_rect(&mut self, rect: Rect, layer: Layer) {
        self.add(Element::new(layer, Shape::Rect(rect)));
    }

    pub fn add_polygon(&mut self, polygon: Polygon, layer: Layer) {
        self.add(Element::new(layer, Shape::Polygon(polygon)));
    }

    pub fn add_label(&mut self, label: Label, layer: Layer) {
        self.add(Element::new(layer, Shape::Label(label)));
    }

    /// Place `child` into this canvas and return the new reference so the
    /// caller can position it.
    pub fn insert(&mut self, child: Canvas) -> &mut Reference {
        self.references.push(Reference::new(child));
        let last = self.references.len() - 1;
        &mut self.references[last]
    }

    pub fn is_flat(&self) -> bool {
        self.references.is_empty()
    }

    /// All leaf elements with every reference transform applied, in
    /// insertion order (own elements first, then each reference depth-first).
    pub fn flattened_elements(&self) -> Vec<Element> {
        let mut out = Vec::with_capacity(self.elements.len());
        self.collect_elements(&Transform::IDENTITY, &mut out);
        out
    }

    fn collect_elements(&self, transform: &Transform, out: &mut Vec<Element>) {
        out.extend(self.elements.iter().map(|e| e.transformed(transform)));
        for reference in &self.references {
            let nested = reference.transform.then(transform);
            reference.canvas.collect_elements(&nested, out);
        }
    }

    /// Bake every reference into leaf elements.
    pub fn flatten(&mut self) {
        if self.is_flat() {
            return;
        }
        self.elements = self.flattened_elements();
        self.references.clear();
    }

    /// Flattened copy holding only the elements on `layers`.
    pub fn extract(&self, layers: &[Layer]) -> Canvas {
        let elements = self
            .flattened_elements()
            .into_iter()
            .filter(|e| layers.contains(&e.layer))
            .collect();
        Canvas {
            name: self.name.clone(),
            elements,
            references: Vec::new(),
        }
    }

    /// Move elements between layers, including inside references.
    /// Layers missing from `map` are left alone.
    pub fn remap_layers(mut self, map: &HashMap<Layer, Layer>) -> Canvas {
        self.remap_in_place(map);
        self
    }

    fn remap_in_place(&mut self, map: &HashMap<Layer, Layer>) {
        for element in &mut self.elements {
            if let Some(&target) = map.get(&element.layer) {
                element.layer = target;
            }
        }
        for reference in &mut self.references {
            reference.canvas.remap_in_place(map);
        }
    }

    /// Apply `transform` to all geometry of this canvas in place.
    pub fn transform(&mut self, transform: &Transform) {
        for element in &mut self.elements {
            *element = element.transformed(transform);
        }
        for reference in &mut self.references {
            reference.transform = reference.transform.then(transform);
        }
    }

    pub fn layers(&self) -> BTreeSet<Layer> {
        self.flattened_elements().iter().map(|e| e.layer).collect()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for element in self.flattened_elements() {
            for p in element.shape.extent_points() {
                match bbox.as_mut() {
                    Some(b) => b.include(p),
                    None => bbox = Some(BoundingBox::from_point(p)),
                }
            }
        }
        bbox
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn from_json(json: &str) -> Result<Canvas> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a canvas from a JSON geometry file.
    pub fn load(path: &Path) -> Result<Canvas> {
        let json = fs::read_to_string(path)?;
        Canvas::from_json(&json).map_err(|e| match e {
            ReticleError::Json(inner) => {
                ReticleError::Geometry(format!("{}: {}", path.display(), inner))
            }
            other => other,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
