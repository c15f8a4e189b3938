//! Leaf shapes: rectangles, polygons and text labels.

use serde::{Deserialize, Serialize};

use super::{Layer, Point, Rotation, Size, Transform};

/// Axis-aligned rectangle. `origin` is the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Rectangle of `size` centered on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        Self::new(
            Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
            size,
        )
    }

    /// Upper-right corner.
    pub fn far_corner(&self) -> Point {
        Point::new(self.origin.x + self.size.width, self.origin.y + self.size.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Quarter-turn transforms map a rectangle onto another axis-aligned
    /// rectangle, so two opposite corners are enough.
    pub fn transformed(&self, t: &Transform) -> Rect {
        let a = t.apply(self.origin);
        let b = t.apply(self.far_corner());
        let min = Point::new(a.x.min(b.x), a.y.min(b.y));
        let max = Point::new(a.x.max(b.x), a.y.max(b.y));
        Rect::new(min, Size::new(max.x - min.x, max.y - min.y))
    }
}

/// Closed polygon; the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn transformed(&self, t: &Transform) -> Polygon {
        Polygon::new(self.points.iter().map(|&p| t.apply(p)).collect())
    }

    /// Even-odd point containment.
    pub fn contains(&self, p: Point) -> bool {
        let pts = &self.points;
        if pts.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            let (pi, pj) = (pts[i], pts[j]);
            if (pi.y > p.y) != (pj.y > p.y)
                && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Horizontal justification of a label relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justify {
    Left,
    #[default]
    Center,
    Right,
}

/// A text annotation.
///
/// The anchor sits on the text baseline; `height` is the glyph cell height.
/// `rotation` turns the baseline about the anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub anchor: Point,
    pub height: f64,
    #[serde(default)]
    pub justify: Justify,
    #[serde(default)]
    pub rotation: Rotation,
}

impl Label {
    pub fn new(text: impl Into<String>, anchor: Point, height: f64) -> Self {
        Self {
            text: text.into(),
            anchor,
            height,
            justify: Justify::Center,
            rotation: Rotation::R0,
        }
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    pub fn transformed(&self, t: &Transform) -> Label {
        Label {
            text: self.text.clone(),
            anchor: t.apply(self.anchor),
            height: self.height * t.magnification,
            justify: self.justify,
            rotation: self.rotation.then(t.rotation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
    Label(Label),
}

impl Shape {
    pub fn transformed(&self, t: &Transform) -> Shape {
        match self {
            Shape::Rect(r) => Shape::Rect(r.transformed(t)),
            Shape::Polygon(p) => Shape::Polygon(p.transformed(t)),
            Shape::Label(l) => Shape::Label(l.transformed(t)),
        }
    }

    /// Points that bound the shape. Labels contribute their anchor only.
    pub fn extent_points(&self) -> Vec<Point> {
        match self {
            Shape::Rect(r) => vec![r.origin, r.far_corner()],
            Shape::Polygon(p) => p.points.clone(),
            Shape::Label(l) => vec![l.anchor],
        }
    }
}

/// A shape placed on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub layer: Layer,
    pub shape: Shape,
}

impl Element {
    pub fn new(layer: Layer, shape: Shape) -> Self {
        Self { layer, shape }
    }

    pub fn transformed(&self, t: &Transform) -> Element {
        Element {
            layer: self.layer,
            shape: self.shape.transformed(t),
        }
    }

    pub fn as_rect(&self) -> Option<&Rect> {
        match &self.shape {
            Shape::Rect(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match &self.shape {
            Shape::Label(l) => Some(l),
            _ => None,
        }
    }
}
