//! # PNG Preview
//!
//! Rasterizes a canvas into a grayscale image for a quick visual check.
//! Geometry is black on white; every layer is drawn the same.
//!
//! Labels use the Spleen 12×24 bitmap font. A glyph cell is `height` tall in
//! layout units, the anchor sits on the bottom of the cell, and the text run
//! is turned by the label rotation about its anchor.

use image::{GrayImage, ImageEncoder, Luma};
use spleen_font::{FONT_12X24, PSF2Font};

use crate::error::{ReticleError, Result};
use crate::geometry::{BoundingBox, Canvas, Justify, Label, Point, Polygon, Rect, Shape};

const GLYPH_WIDTH: usize = 12;
const GLYPH_HEIGHT: usize = 24;

const INK: Luma<u8> = Luma([0]);
const PAPER: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    /// Pixels along the longer side of the drawing.
    pub max_dimension: u32,
    /// Blank border, in pixels.
    pub margin: u32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            margin: 16,
        }
    }
}

/// Maps layout coordinates to pixel coordinates (y flipped).
struct Raster {
    img: GrayImage,
    origin: Point,
    top: f64,
    pixels_per_unit: f64,
    margin: f64,
}

impl Raster {
    fn new(bbox: BoundingBox, options: &PreviewOptions) -> Result<Self> {
        let extent = bbox.width().max(bbox.height());
        if options.max_dimension == 0 {
            return Err(ReticleError::Preview("preview size must be positive".to_string()));
        }
        let pixels_per_unit = if extent > 0.0 {
            options.max_dimension as f64 / extent
        } else {
            1.0
        };
        let width = (bbox.width() * pixels_per_unit).ceil() as u32 + 2 * options.margin + 1;
        let height = (bbox.height() * pixels_per_unit).ceil() as u32 + 2 * options.margin + 1;

        Ok(Self {
            img: GrayImage::from_pixel(width, height, Luma([PAPER])),
            origin: bbox.min,
            top: bbox.max.y,
            pixels_per_unit,
            margin: options.margin as f64,
        })
    }

    fn to_pixel(&self, p: Point) -> (f64, f64) {
        (
            (p.x - self.origin.x) * self.pixels_per_unit + self.margin,
            (self.top - p.y) * self.pixels_per_unit + self.margin,
        )
    }

    fn to_layout(&self, px: u32, py: u32) -> Point {
        Point::new(
            (px as f64 + 0.5 - self.margin) / self.pixels_per_unit + self.origin.x,
            self.top - (py as f64 + 0.5 - self.margin) / self.pixels_per_unit,
        )
    }

    /// Pixel ranges covered by the layout box `min..max`, at least one pixel
    /// wide. `None` when the box lies entirely outside the image.
    fn pixel_span(&self, min: Point, max: Point) -> Option<(u32, u32, u32, u32)> {
        let (x0, y1) = self.to_pixel(min);
        let (x1, y0) = self.to_pixel(max);
        let (width, height) = (self.img.width() as f64, self.img.height() as f64);
        if x1 <= 0.0 || y1 <= 0.0 || x0 >= width || y0 >= height {
            return None;
        }
        let (sx, sy) = (x0.floor().max(0.0) as u32, y0.floor().max(0.0) as u32);
        let ex = (x1.ceil().min(width) as u32).max(sx + 1);
        let ey = (y1.ceil().min(height) as u32).max(sy + 1);
        Some((sx, sy, ex, ey))
    }

    fn fill_box(&mut self, min: Point, max: Point) {
        let Some((sx, sy, ex, ey)) = self.pixel_span(min, max) else {
            return;
        };
        for y in sy..ey {
            for x in sx..ex {
                self.img.put_pixel(x, y, INK);
            }
        }
    }

    fn fill_rect(&mut self, rect: &Rect) {
        self.fill_box(rect.origin, rect.far_corner());
    }

    fn fill_polygon(&mut self, polygon: &Polygon) {
        let Some(first) = polygon.points.first() else {
            return;
        };
        let mut bbox = BoundingBox::from_point(*first);
        for &p in &polygon.points {
            bbox.include(p);
        }
        let Some((sx, sy, ex, ey)) = self.pixel_span(bbox.min, bbox.max) else {
            return;
        };
        for y in sy..ey {
            for x in sx..ex {
                if polygon.contains(self.to_layout(x, y)) {
                    self.img.put_pixel(x, y, INK);
                }
            }
        }
    }

    fn draw_label(&mut self, label: &Label, font: &mut PSF2Font) {
        let count = label.text.chars().count();
        let unit = label.height / GLYPH_HEIGHT as f64;
        let run = (count * GLYPH_WIDTH) as f64;
        let start = match label.justify {
            Justify::Left => 0.0,
            Justify::Center => -run / 2.0,
            Justify::Right => -run,
        };

        for (i, ch) in label.text.chars().enumerate() {
            let mut buf = [0u8; 4];
            let Some(glyph) = font.glyph_for_utf8(ch.encode_utf8(&mut buf).as_bytes()) else {
                continue;
            };
            for (row, bits) in glyph.enumerate() {
                for (col, on) in bits.enumerate() {
                    if !on {
                        continue;
                    }
                    let u = start + (i * GLYPH_WIDTH + col) as f64 + 0.5;
                    let v = (GLYPH_HEIGHT - row) as f64 - 0.5;
                    let center =
                        label.anchor + label.rotation.apply(Point::new(u * unit, v * unit));
                    let half = Point::new(unit / 2.0, unit / 2.0);
                    self.fill_box(center - half, center + half);
                }
            }
        }
    }

    fn encode(self) -> Result<Vec<u8>> {
        let (width, height) = self.img.dimensions();
        let mut png_bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(self.img.as_raw(), width, height, image::ExtendedColorType::L8)
            .map_err(|e: image::ImageError| ReticleError::Preview(e.to_string()))?;
        Ok(png_bytes)
    }
}

/// Rasterize `canvas` to PNG bytes.
///
/// An empty canvas yields a blank image the size of the margins.
pub fn render_png(canvas: &Canvas, options: &PreviewOptions) -> Result<Vec<u8>> {
    let bbox = canvas
        .bounding_box()
        .unwrap_or_else(|| BoundingBox::from_point(Point::ORIGIN));
    let mut raster = Raster::new(bbox, options)?;
    let mut font = PSF2Font::new(FONT_12X24)
        .map_err(|_| ReticleError::Preview("cannot load Spleen 12x24 font".to_string()))?;

    for element in canvas.flattened_elements() {
        match &element.shape {
            Shape::Rect(r) => raster.fill_rect(r),
            Shape::Polygon(p) => raster.fill_polygon(p),
            Shape::Label(l) => raster.draw_label(l, &mut font),
        }
    }

    raster.encode()
}
