//! Field kinds and tagged field values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Declared kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Int,
    String,
    Float,
}

impl FieldKind {
    /// Recognized-kinds table: keyword in a `create type` line → kind
    ///
    /// | keyword           | kind   |
    /// |-------------------|--------|
    /// | `int`             | Int    |
    /// | `str`, `string`   | String |
    /// | `float`           | Float  |
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "int" => Some(FieldKind::Int),
            "str" | "string" => Some(FieldKind::String),
            "float" => Some(FieldKind::Float),
            _ => None,
        }
    }

    /// Canonical keyword for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            FieldKind::Int => "int",
            FieldKind::String => "str",
            FieldKind::Float => "float",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single typed field value
///
/// Floats are never NaN or infinite (rejected at parse time), so the
/// total order below agrees with numeric order for every stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldValue {
    Int(i64),
    Str(String),
    Float(f64),
}

impl FieldValue {
    /// Runtime kind of this value
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Str(_) => FieldKind::String,
            FieldValue::Float(_) => FieldKind::Float,
        }
    }

    /// Parse command-line text as a value of the given kind
    ///
    /// Returns `None` when the text is not a well-formed value of `kind`:
    /// - Int: optional sign and digits, within `i64`
    /// - String: ASCII letters/digits only, `1..=max_string_len` chars
    /// - Float: anything `f64` parses that is finite
    pub fn parse(kind: FieldKind, text: &str, max_string_len: usize) -> Option<Self> {
        match kind {
            FieldKind::Int => text.parse::<i64>().ok().map(FieldValue::Int),
            FieldKind::String => is_valid_string(text, max_string_len)
                .then(|| FieldValue::Str(text.to_string())),
            FieldKind::Float => text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Float),
        }
    }

    /// Check a typed value against the kind and limits it is stored under
    pub fn conforms_to(&self, kind: FieldKind, max_string_len: usize) -> bool {
        match (self, kind) {
            (FieldValue::Int(_), FieldKind::Int) => true,
            (FieldValue::Str(s), FieldKind::String) => is_valid_string(s, max_string_len),
            (FieldValue::Float(v), FieldKind::Float) => v.is_finite(),
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Int(_) => 0,
            FieldValue::Str(_) => 1,
            FieldValue::Float(_) => 2,
        }
    }
}

fn is_valid_string(s: &str, max_len: usize) -> bool {
    !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::Str(a), FieldValue::Str(b)) => a.cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            FieldValue::Int(v) => v.hash(state),
            FieldValue::Str(s) => s.hash(state),
            FieldValue::Float(v) => v.to_bits().hash(state),
        }
    }
}
