//! Bar/space symbology tables.
//!
//! A table maps each supported character to a 9-token [`Symbol`]. Tables are
//! validated once when loaded; encoding never re-checks them.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens per symbol.
pub const SYMBOL_LEN: usize = 9;

/// Wide tokens per symbol (the remaining six are narrow).
pub const WIDE_PER_SYMBOL: usize = 3;

/// Key of the reserved start/stop frame.
pub const START_KEY: &str = "start";

/// Load-time validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbologyError {
    #[error("unknown bar token '{token}' in symbol '{key}'")]
    UnknownToken { key: String, token: String },

    #[error("symbol '{key}' has {count} tokens, expected 9")]
    WrongTokenCount { key: String, count: usize },

    #[error("symbol '{key}' has {count} wide tokens, expected 3")]
    WrongWideCount { key: String, count: usize },

    #[error("symbol key '{0}' must be a single character or \"start\"")]
    InvalidKey(String),

    #[error("symbology table has no \"start\" symbol")]
    MissingStart,

    #[error("symbol key '{0}' is defined more than once (keys are case-insensitive)")]
    DuplicateKey(String),

    #[error("invalid symbology JSON: {0}")]
    Json(String),
}

/// One bar/space token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarKind {
    WideBar,
    NarrowBar,
    WideSpace,
    NarrowSpace,
}

impl BarKind {
    /// Parse the two-letter table code (`wb`, `nb`, `ws`, `ns`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "wb" => Some(BarKind::WideBar),
            "nb" => Some(BarKind::NarrowBar),
            "ws" => Some(BarKind::WideSpace),
            "ns" => Some(BarKind::NarrowSpace),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            BarKind::WideBar => "wb",
            BarKind::NarrowBar => "nb",
            BarKind::WideSpace => "ws",
            BarKind::NarrowSpace => "ns",
        }
    }

    /// Drawn tokens; spaces only advance the cursor.
    #[inline]
    pub fn is_bar(self) -> bool {
        matches!(self, BarKind::WideBar | BarKind::NarrowBar)
    }

    #[inline]
    pub fn is_wide(self) -> bool {
        matches!(self, BarKind::WideBar | BarKind::WideSpace)
    }
}

/// The fixed-length token pattern for one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub [BarKind; SYMBOL_LEN]);

impl Symbol {
    pub fn tokens(&self) -> &[BarKind; SYMBOL_LEN] {
        &self.0
    }

    pub fn bar_count(&self) -> usize {
        self.0.iter().filter(|t| t.is_bar()).count()
    }

    fn parse<S: AsRef<str>>(key: &str, codes: &[S]) -> Result<Self, SymbologyError> {
        if codes.len() != SYMBOL_LEN {
            return Err(SymbologyError::WrongTokenCount {
                key: key.to_string(),
                count: codes.len(),
            });
        }
        let mut tokens = [BarKind::NarrowSpace; SYMBOL_LEN];
        for (slot, code) in tokens.iter_mut().zip(codes) {
            *slot = BarKind::from_code(code.as_ref()).ok_or_else(|| SymbologyError::UnknownToken {
                key: key.to_string(),
                token: code.as_ref().to_string(),
            })?;
        }
        let wide = tokens.iter().filter(|t| t.is_wide()).count();
        if wide != WIDE_PER_SYMBOL {
            return Err(SymbologyError::WrongWideCount {
                key: key.to_string(),
                count: wide,
            });
        }
        Ok(Symbol(tokens))
    }
}

/// Immutable character → symbol mapping plus the start/stop frame.
///
/// Keys are stored lowercase; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbologyTable {
    symbols: BTreeMap<char, Symbol>,
    start: Symbol,
}

impl SymbologyTable {
    /// Build and validate a table from `(key, token codes)` entries.
    ///
    /// Keys are single characters (folded to lowercase) or `"start"`.
    pub fn from_entries<K, S, I>(entries: I) -> Result<Self, SymbologyError>
    where
        K: AsRef<str>,
        S: AsRef<str>,
        I: IntoIterator<Item = (K, Vec<S>)>,
    {
        let mut symbols = BTreeMap::new();
        let mut start = None;

        for (key, codes) in entries {
            let key = key.as_ref();
            let symbol = Symbol::parse(key, &codes)?;
            if key == START_KEY {
                if start.replace(symbol).is_some() {
                    return Err(SymbologyError::DuplicateKey(key.to_string()));
                }
                continue;
            }
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(SymbologyError::InvalidKey(key.to_string())),
            };
            for lower in ch.to_lowercase() {
                if symbols.insert(lower, symbol).is_some() {
                    return Err(SymbologyError::DuplicateKey(key.to_string()));
                }
            }
        }

        let start = start.ok_or(SymbologyError::MissingStart)?;
        Ok(Self { symbols, start })
    }

    /// Load a table from a JSON object of `"key": ["wb", "ns", ...]`.
    pub fn from_json(json: &str) -> Result<Self, SymbologyError> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| SymbologyError::Json(e.to_string()))?;
        Self::from_entries(raw)
    }

    /// The built-in stepper barcode table, validated on first use and shared.
    pub fn builtin() -> Result<&'static SymbologyTable, SymbologyError> {
        static TABLE: OnceLock<Result<SymbologyTable, SymbologyError>> = OnceLock::new();
        TABLE
            .get_or_init(|| {
                Self::from_entries(
                    BUILTIN_TABLE
                        .iter()
                        .map(|(key, codes)| (*key, codes.to_vec())),
                )
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Symbol for `ch`, case-insensitive. `None` for unsupported characters.
    pub fn get(&self, ch: char) -> Option<&Symbol> {
        if let Some(symbol) = self.symbols.get(&ch) {
            return Some(symbol);
        }
        let mut lower = ch.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) => self.symbols.get(&l),
            _ => None,
        }
    }

    pub fn contains(&self, ch: char) -> bool {
        self.get(ch).is_some()
    }

    pub fn start(&self) -> &Symbol {
        &self.start
    }

    /// Supported characters in table order.
    pub fn characters(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Stepper-readable 3-of-9 table: letters, digits, `- . $ / + %` and space.
///
/// | Code | Token |
/// |------|-------|
/// | `wb` | wide bar |
/// | `nb` | narrow bar |
/// | `ws` | wide space |
/// | `ns` | narrow space |
#[rustfmt::skip]
const BUILTIN_TABLE: &[(&str, [&str; SYMBOL_LEN])] = &[
    ("a", ["wb", "ns", "nb", "ns", "nb", "ws", "nb", "ns", "wb"]),
    ("b", ["nb", "ns", "wb", "ns", "nb", "ws", "nb", "ns", "wb"]),
    ("c", ["wb", "ns", "wb", "ns", "nb", "ws", "nb", "ns", "nb"]),
    ("d", ["nb", "ns", "nb", "ns", "wb", "ws", "nb", "ns", "wb"]),
    ("e", ["wb", "ns", "nb", "ns", "wb", "ws", "nb", "ns", "nb"]),
    ("f", ["nb", "ns", "wb", "ns", "wb", "ws", "nb", "ns", "nb"]),
    ("g", ["nb", "ns", "nb", "ns", "nb", "ws", "wb", "ns", "wb"]),
    ("h", ["wb", "ns", "nb", "ns", "nb", "ws", "wb", "ns", "nb"]),
    ("i", ["nb", "ns", "wb", "ns", "nb", "ws", "wb", "ns", "nb"]),
    ("j", ["nb", "ns", "nb", "ns", "wb", "ws", "wb", "ns", "nb"]),
    ("k", ["wb", "ns", "nb", "ns", "nb", "ns", "nb", "ws", "wb"]),
    ("l", ["nb", "ns", "wb", "ns", "nb", "ns", "nb", "ws", "wb"]),
    ("m", ["wb", "ns", "wb", "ns", "nb", "ns", "nb", "ws", "nb"]),
    ("n", ["nb", "ns", "nb", "ns", "wb", "ns", "nb", "ws", "wb"]),
    ("o", ["wb", "ns", "nb", "ns", "wb", "ns", "nb", "ws", "nb"]),
    ("p", ["nb", "ns", "wb", "ns", "wb", "ns", "nb", "ws", "nb"]),
    ("q", ["nb", "ns", "nb", "ns", "nb", "ns", "wb", "ws", "wb"]),
    ("r", ["wb", "ns", "nb", "ns", "nb", "ns", "wb", "ws", "nb"]),
    ("s", ["nb", "ns", "wb", "ns", "nb", "ns", "wb", "ws", "nb"]),
    ("t", ["nb", "ns", "nb", "ns", "wb", "ns", "wb", "ws", "nb"]),
    ("u", ["wb", "ws", "nb", "ns", "nb", "ns", "nb", "ns", "wb"]),
    ("v", ["nb", "ws", "wb", "ns", "nb", "ns", "nb", "ns", "wb"]),
    ("w", ["wb", "ws", "wb", "ns", "nb", "ns", "nb", "ns", "nb"]),
    ("x", ["nb", "ws", "nb", "ns", "wb", "ns", "nb", "ns", "wb"]),
    ("y", ["wb", "ws", "nb", "ns", "wb", "ns", "nb", "ns", "nb"]),
    ("z", ["nb", "ws", "wb", "ns", "wb", "ns", "nb", "ns", "nb"]),
    ("1", ["wb", "ns", "nb", "ws", "nb", "ns", "nb", "ns", "wb"]),
    ("2", ["nb", "ns", "wb", "ws", "nb", "ns", "nb", "ns", "wb"]),
    ("3", ["wb", "ns", "wb", "ws", "nb", "ns", "nb", "ns", "nb"]),
    ("4", ["nb", "ns", "nb", "ws", "wb", "ns", "nb", "ns", "wb"]),
    ("5", ["wb", "ns", "nb", "ws", "wb", "ns", "nb", "ns", "nb"]),
    ("6", ["nb", "ns", "wb", "ws", "wb", "ns", "nb", "ns", "nb"]),
    ("7", ["nb", "ns", "nb", "ws", "nb", "ns", "wb", "ns", "wb"]),
    ("8", ["wb", "ns", "nb", "ws", "nb", "ns", "wb", "ns", "nb"]),
    ("9", ["nb", "ns", "wb", "ws", "nb", "ns", "wb", "ns", "nb"]),
    ("0", ["nb", "ns", "nb", "ws", "wb", "ns", "wb", "ns", "nb"]),
    ("-", ["nb", "ws", "nb", "ns", "nb", "ns", "wb", "ns", "wb"]),
    (".", ["wb", "ws", "nb", "ns", "nb", "ns", "wb", "ns", "nb"]),
    ("$", ["nb", "ws", "nb", "ws", "nb", "ws", "nb", "ns", "nb"]),
    ("/", ["nb", "ws", "nb", "ws", "nb", "ns", "nb", "ws", "nb"]),
    ("+", ["nb", "ws", "nb", "ns", "nb", "ws", "nb", "ws", "nb"]),
    ("%", ["nb", "ns", "nb", "ws", "nb", "ws", "nb", "ws", "nb"]),
    (" ", ["nb", "ws", "wb", "ns", "nb", "ns", "wb", "ns", "nb"]),
    ("start", ["nb", "ws", "nb", "ns", "wb", "ns", "wb", "ns", "nb"]),
];
