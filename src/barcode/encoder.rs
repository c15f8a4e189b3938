//! Text → symbols → bar rectangles.

use log::debug;
use serde::{Deserialize, Serialize};

use super::symbology::{BarKind, Symbol, SymbologyTable};
use crate::error::Result;
use crate::geometry::{Canvas, Layer, Point, Rect, Size};

/// Characters kept by [`barcode`] before filtering.
pub const DEFAULT_MAX_LENGTH: usize = 12;

/// Physical token widths and margins, in layout units.
///
/// ```text
/// │ leading quiet zone │ start │gap│ c0 │gap│ ... │ stop │gap│ (trailing zone: caller)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarMetrics {
    pub narrow_width: f64,
    pub wide_width: f64,
    /// Advance after every symbol, stop frame included.
    pub inter_character_gap: f64,
    pub leading_quiet_zone: f64,
    /// Not emitted by [`render`]; reported so callers can reserve it.
    pub trailing_quiet_zone: f64,
}

impl BarMetrics {
    /// Stepper barcode dimensions (nm at reticle scale).
    pub const ASML300: Self = Self {
        narrow_width: 200.0,
        wide_width: 450.0,
        inter_character_gap: 200.0,
        leading_quiet_zone: 8000.0,
        trailing_quiet_zone: 2000.0,
    };

    #[inline]
    pub fn token_width(&self, kind: BarKind) -> f64 {
        if kind.is_wide() {
            self.wide_width
        } else {
            self.narrow_width
        }
    }

    /// Advance per symbol: 6 narrow + 3 wide tokens plus the gap.
    pub fn character_width(&self) -> f64 {
        6.0 * self.narrow_width + 3.0 * self.wide_width + self.inter_character_gap
    }

    /// Rendered width for `char_count` encoded characters (start and stop included).
    pub fn total_width(&self, char_count: usize) -> f64 {
        self.leading_quiet_zone + (2 + char_count) as f64 * self.character_width()
    }
}

impl Default for BarMetrics {
    fn default() -> Self {
        Self::ASML300
    }
}

/// Truncate to `max_length` characters, lowercase, and drop anything the
/// table cannot encode.
pub fn filter_text(text: &str, max_length: usize, table: &SymbologyTable) -> String {
    let truncated: String = text.chars().take(max_length).collect();
    let lowered = truncated.to_lowercase();
    let kept: String = lowered.chars().filter(|&c| table.contains(c)).collect();
    if kept.chars().count() != lowered.chars().count() {
        debug!(
            "barcode text {:?}: dropped unsupported characters, encoding {:?}",
            text, kept
        );
    }
    kept
}

/// Encode `text` as `start, c0, c1, ..., start`.
///
/// Excess characters are truncated and unsupported ones dropped; an input
/// with nothing encodable yields just the start/stop pair.
pub fn encode(text: &str, max_length: usize, table: &SymbologyTable) -> Vec<Symbol> {
    let filtered = filter_text(text, max_length, table);
    let mut symbols = Vec::with_capacity(filtered.len() + 2);
    symbols.push(*table.start());
    symbols.extend(filtered.chars().filter_map(|c| table.get(c)).copied());
    symbols.push(*table.start());
    symbols
}

/// Placed bars of one barcode, all on one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeLayout {
    /// Drawn bars, left to right, vertically centered on y = 0.
    pub bars: Vec<Rect>,
    pub layer: Layer,
    pub height: f64,
    /// Cursor position after the last symbol.
    pub width: f64,
    pub trailing_quiet_zone: f64,
}

impl BarcodeLayout {
    /// Width including the trailing quiet zone the caller must keep clear.
    pub fn footprint_width(&self) -> f64 {
        self.width + self.trailing_quiet_zone
    }

    /// Flat canvas with one rectangle per bar.
    pub fn into_canvas(self, name: impl Into<String>) -> Canvas {
        let mut canvas = Canvas::new(name);
        for bar in self.bars {
            canvas.add_rect(bar, self.layer);
        }
        canvas
    }
}

/// Render symbols with the default [`BarMetrics::ASML300`] dimensions.
pub fn render(symbols: &[Symbol], height: f64, layer: Layer) -> BarcodeLayout {
    render_with_metrics(symbols, height, layer, &BarMetrics::ASML300)
}

/// Single left-to-right pass: bars emit a rectangle and advance, spaces only
/// advance, and every symbol is followed by the inter-character gap.
pub fn render_with_metrics(
    symbols: &[Symbol],
    height: f64,
    layer: Layer,
    metrics: &BarMetrics,
) -> BarcodeLayout {
    let mut bars = Vec::with_capacity(symbols.len() * 5);
    let mut x = metrics.leading_quiet_zone;

    for symbol in symbols {
        for &kind in symbol.tokens() {
            let width = metrics.token_width(kind);
            if kind.is_bar() {
                bars.push(Rect::new(Point::new(x, -0.5 * height), Size::new(width, height)));
            }
            x += width;
        }
        x += metrics.inter_character_gap;
    }

    BarcodeLayout {
        bars,
        layer,
        height,
        width: x,
        trailing_quiet_zone: metrics.trailing_quiet_zone,
    }
}

/// Stepper-readable barcode canvas for `text` using the built-in table.
///
/// At most [`DEFAULT_MAX_LENGTH`] characters are encoded; the canvas is
/// already flat.
pub fn barcode(text: &str, height: f64, layer: Layer) -> Result<Canvas> {
    let table = SymbologyTable::builtin()?;
    let symbols = encode(text, DEFAULT_MAX_LENGTH, table);
    Ok(render(&symbols, height, layer).into_canvas(format!("barcode_{}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER: Layer = Layer::new(4, 0);

    fn table() -> &'static SymbologyTable {
        SymbologyTable::builtin().unwrap()
    }

    #[test]
    fn test_character_width() {
        assert_eq!(BarMetrics::ASML300.character_width(), 2750.0);
    }

    #[test]
    fn test_filter_drops_unsupported() {
        assert_eq!(filter_text("AB#1", 12, table()), "ab1");
        assert_eq!(encode("AB#1", 12, table()), encode("AB1", 12, table()));
    }

    #[test]
    fn test_truncates_before_filtering() {
        // '#' counts toward the limit even though it is dropped afterwards
        assert_eq!(filter_text("#BCDEFGHIJKLMNOP", 12, table()), "bcdefghijkl");
        assert_eq!(filter_text("ABCDEFGHIJKLMNOPQRST", 12, table()), "abcdefghijkl");
    }

    #[test]
    fn test_encode_frames_with_start() {
        let symbols = encode("A", 12, table());
        assert_eq!(symbols.len(), 3);
        assert_eq!(symbols[0], *table().start());
        assert_eq!(symbols[1], *table().get('a').unwrap());
        assert_eq!(symbols[2], *table().start());
    }

    #[test]
    fn test_empty_input_is_start_stop_pair() {
        let symbols = encode("###", 12, table());
        assert_eq!(symbols, vec![*table().start(), *table().start()]);

        let layout = render(&symbols, 5000.0, LAYER);
        assert_eq!(layout.bars.len(), 10);
        assert_eq!(layout.width, BarMetrics::ASML300.total_width(0));
    }

    #[test]
    fn test_render_positions() {
        let layout = render(&[*table().start()], 100.0, LAYER);
        // start = nb ws nb ns wb ns wb ns nb
        let xs: Vec<f64> = layout.bars.iter().map(|r| r.origin.x).collect();
        assert_eq!(xs, vec![8000.0, 8650.0, 9050.0, 9700.0, 10350.0]);
        let widths: Vec<f64> = layout.bars.iter().map(|r| r.size.width).collect();
        assert_eq!(widths, vec![200.0, 200.0, 450.0, 450.0, 200.0]);
        assert!(layout.bars.iter().all(|r| r.origin.y == -50.0 && r.size.height == 100.0));
        assert_eq!(layout.width, 8000.0 + 2750.0);
    }

    #[test]
    fn test_footprint_includes_trailing_zone() {
        let layout = render(&encode("X", 12, table()), 10.0, LAYER);
        assert_eq!(layout.footprint_width(), layout.width + 2000.0);
    }

    #[test]
    fn test_barcode_canvas() {
        let canvas = barcode("AB-R0", 5000.0, LAYER).unwrap();
        assert!(canvas.is_flat());
        assert_eq!(canvas.elements.len(), 7 * 5);
        assert!(canvas.elements.iter().all(|e| e.layer == LAYER));
    }
}
