//! # Stepper Barcode
//!
//! Linear 3-of-9 style barcode drawn as rectangles on a mask layer, readable
//! by the lithography stepper's reticle barcode reader.
//!
//! ## Pipeline
//!
//! ```text
//! "ID-R0" → truncate (12) → lowercase → drop unsupported → [start, i, d, -, r, 0, start]
//!         → render: one Rect per bar, spaces advance the cursor
//! ```
//!
//! ## Supported Characters
//!
//! | Class | Characters |
//! |-------|------------|
//! | Letters | A-Z (case-insensitive) |
//! | Digits | 0-9 |
//! | Punctuation | `-` `.` `$` `/` `+` `%` space |
//!
//! Anything else is silently dropped, never substituted.
//!
//! ## Usage
//!
//! ```
//! use reticle::barcode::{self, SymbologyTable};
//! use reticle::geometry::Layer;
//!
//! let table = SymbologyTable::builtin().unwrap();
//! let symbols = barcode::encode("RET-01", 12, table);
//! let layout = barcode::render(&symbols, 5000.0, Layer::new(4, 0));
//!
//! // 6 characters + start + stop, 5 bars each
//! assert_eq!(layout.bars.len(), 8 * 5);
//! ```

mod encoder;
mod symbology;

pub use encoder::{
    BarMetrics, BarcodeLayout, DEFAULT_MAX_LENGTH, barcode, encode, filter_text, render,
    render_with_metrics,
};
pub use symbology::{
    BarKind, START_KEY, SYMBOL_LEN, Symbol, SymbologyError, SymbologyTable, WIDE_PER_SYMBOL,
};
