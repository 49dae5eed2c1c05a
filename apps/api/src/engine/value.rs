use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// A single cell returned by the embedded database.
///
/// Variants follow SQLite's storage classes so integers stay integers and
/// `NULL` never collapses into a string. Serializes untagged, so JSON sees
/// plain numbers, strings and `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Null,
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Integer(i) => Some(*i as f64),
            ScalarValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Rank of the storage class in SQLite's cross-type sort order.
    fn class_rank(&self) -> u8 {
        match self {
            ScalarValue::Null => 0,
            ScalarValue::Integer(_) | ScalarValue::Real(_) => 1,
            ScalarValue::Text(_) => 2,
            ScalarValue::Blob(_) => 3,
        }
    }

    /// Total order matching `ORDER BY` in SQLite (BINARY collation):
    /// NULL < numeric < text < blob, with integers and reals compared by value.
    pub fn sql_cmp(&self, other: &ScalarValue) -> Ordering {
        match (self, other) {
            (ScalarValue::Integer(a), ScalarValue::Integer(b)) => a.cmp(b),
            (ScalarValue::Text(a), ScalarValue::Text(b)) => a.cmp(b),
            (ScalarValue::Blob(a), ScalarValue::Blob(b)) => a.cmp(b),
            (a, b) if a.class_rank() == 1 && b.class_rank() == 1 => {
                let (x, y) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (a, b) => a.class_rank().cmp(&b.class_rank()),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Integer(i) => write!(f, "{i}"),
            ScalarValue::Real(r) => write!(f, "{r}"),
            ScalarValue::Text(s) => write!(f, "{s}"),
            ScalarValue::Blob(bytes) => {
                write!(f, "x'")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                write!(f, "'")
            }
            ScalarValue::Null => write!(f, "NULL"),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Integer(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Real(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}
