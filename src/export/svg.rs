//! SVG writer.
//!
//! Layout coordinates are y-up; SVG is y-down, so every y is negated on the
//! way out. Labels become `<text>` elements rotated about their anchor.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::geometry::{Canvas, Element, Justify, Layer, Shape};

/// Fill colors cycled by layer number.
const PALETTE: &[&str] = &[
    "#1f77b4", "#d62728", "#2ca02c", "#9467bd", "#ff7f0e", "#17becf", "#8c564b", "#e377c2",
];

/// Margin around the drawing, as a fraction of its larger side.
const MARGIN: f64 = 0.02;

fn layer_color(layer: Layer) -> &'static str {
    PALETTE[layer.layer as usize % PALETTE.len()]
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a canvas (flattened on the fly) as a standalone SVG document.
pub fn render_svg(canvas: &Canvas) -> String {
    let elements = canvas.flattened_elements();

    let (x, y, w, h) = match canvas.bounding_box() {
        Some(bbox) => {
            let margin = MARGIN * bbox.width().max(bbox.height()).max(1.0);
            (
                bbox.min.x - margin,
                -bbox.max.y - margin,
                bbox.width() + 2.0 * margin,
                bbox.height() + 2.0 * margin,
            )
        }
        None => (0.0, 0.0, 1.0, 1.0),
    };

    let mut by_layer: BTreeMap<Layer, Vec<&Element>> = BTreeMap::new();
    for element in &elements {
        by_layer.entry(element.layer).or_default().push(element);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        x, y, w, h
    );
    let _ = writeln!(out, "<title>{}</title>", escape(&canvas.name));

    for (layer, elements) in by_layer {
        let color = layer_color(layer);
        let _ = writeln!(
            out,
            r#"<g id="layer-{}-{}" fill="{}" fill-opacity="0.8">"#,
            layer.layer, layer.datatype, color
        );
        for element in elements {
            write_shape(&mut out, &element.shape);
        }
        out.push_str("</g>\n");
    }

    out.push_str("</svg>\n");
    out
}

fn write_shape(out: &mut String, shape: &Shape) {
    match shape {
        Shape::Rect(r) => {
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}"/>"#,
                r.origin.x,
                -(r.origin.y + r.size.height),
                r.size.width,
                r.size.height
            );
        }
        Shape::Polygon(p) => {
            let points: Vec<String> = p
                .points
                .iter()
                .map(|pt| format!("{},{}", pt.x, -pt.y))
                .collect();
            let _ = writeln!(out, r#"<polygon points="{}"/>"#, points.join(" "));
        }
        Shape::Label(l) => {
            let anchor = match l.justify {
                Justify::Left => "start",
                Justify::Center => "middle",
                Justify::Right => "end",
            };
            let (ax, ay) = (l.anchor.x, -l.anchor.y);
            // counter-clockwise in layout space is clockwise-negative in SVG
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" font-family="monospace" font-size="{}" text-anchor="{}" transform="rotate({} {} {})">{}</text>"#,
                ax,
                ay,
                l.height,
                anchor,
                -l.rotation.degrees(),
                ax,
                ay,
                escape(&l.text)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Label, Point, Polygon, Rect, Rotation, Size};

    #[test]
    fn test_one_group_per_layer() {
        let mut canvas = Canvas::new("r");
        canvas.add_rect(Rect::new(Point::ORIGIN, Size::new(1.0, 1.0)), Layer::new(4, 0));
        canvas.add_rect(Rect::new(Point::new(2.0, 0.0), Size::new(1.0, 1.0)), Layer::new(4, 0));
        canvas.add_polygon(
            Polygon::new(vec![Point::ORIGIN, Point::new(1.0, 0.0), Point::new(0.0, 1.0)]),
            Layer::new(63, 0),
        );
        let svg = render_svg(&canvas);
        assert_eq!(svg.matches("<g ").count(), 2);
        assert!(svg.contains(r#"id="layer-4-0""#));
        assert!(svg.contains(r#"id="layer-63-0""#));
        assert_eq!(svg.matches("<rect").count(), 2);
    }

    #[test]
    fn test_y_axis_flipped() {
        let mut canvas = Canvas::new("r");
        canvas.add_rect(Rect::new(Point::new(0.0, 10.0), Size::new(5.0, 2.0)), Layer::new(1, 0));
        let svg = render_svg(&canvas);
        assert!(svg.contains(r#"<rect x="0" y="-12" width="5" height="2"/>"#));
    }

    #[test]
    fn test_label_rotation_and_escape() {
        let mut canvas = Canvas::new("r");
        let mut label = Label::new("A<B", Point::new(3.0, 4.0), 2.0);
        label.rotation = Rotation::R90;
        canvas.add_label(label, Layer::new(4, 0));
        let svg = render_svg(&canvas);
        assert!(svg.contains("A&lt;B"));
        assert!(svg.contains("rotate(-90 3 -4)"));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }

    #[test]
    fn test_empty_canvas_is_valid_document() {
        let svg = render_svg(&Canvas::new("empty"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
