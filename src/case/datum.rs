use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::ColumnType;

const FLOAT_TOLERANCE: f64 = 1e-6;
const DOUBLE_TOLERANCE: f64 = 1e-9;

/// A single cell value, as written in a fixture or returned by an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(n) => Some(*n as f64),
            Datum::Float(f) => Some(*f),
            Datum::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Int(n) => Some(*n),
            Datum::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            Datum::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Compares two cells under the declared column type.
    ///
    /// Floating columns compare with a relative tolerance; integral columns
    /// accept any representation of the same integer.
    pub fn matches(&self, other: &Datum, ty: Option<ColumnType>) -> bool {
        match (self, other) {
            (Datum::Null, Datum::Null) => return true,
            (Datum::Null, _) | (_, Datum::Null) => return false,
            _ => {}
        }
        match ty {
            Some(ty) if ty.is_floating() => {
                let tolerance = if ty == ColumnType::Float {
                    FLOAT_TOLERANCE
                } else {
                    DOUBLE_TOLERANCE
                };
                match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => approx_eq(a, b, tolerance),
                    _ => false,
                }
            }
            Some(ty) if ty.is_integral() => match (self.as_i64(), other.as_i64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            Some(ColumnType::String) | Some(ColumnType::Date) => {
                self.to_string() == other.to_string()
            }
            _ => self == other,
        }
    }

    /// Total order used to sort rows by an `order` column. Nulls sort first.
    pub fn sort_cmp(&self, other: &Datum) -> Ordering {
        match (self, other) {
            (Datum::Null, Datum::Null) => Ordering::Equal,
            (Datum::Null, _) => Ordering::Less,
            (_, Datum::Null) => Ordering::Greater,
            (Datum::Bool(a), Datum::Bool(b)) => a.cmp(b),
            (Datum::Str(a), Datum::Str(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tolerance * scale
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("NULL"),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Int(n) => write!(f, "{}", n),
            Datum::Float(x) => write!(f, "{}", x),
            Datum::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Str(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Str(s)
    }
}

impl From<i64> for Datum {
    fn from(n: i64) -> Self {
        Datum::Int(n)
    }
}

impl From<f64> for Datum {
    fn from(x: f64) -> Self {
        Datum::Float(x)
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

/// Renders a row as a single comma separated line.
pub fn render_row(row: &[Datum]) -> String {
    row.iter()
        .map(Datum::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
