//! Cell values
//!
//! A `CellValue` is the scalar projection of a row that filters and sorts work
//! over. Columns decide how a row maps to a value when they are normalized, so
//! predicates and comparators never see an untyped value.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Scalar value produced by a column accessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    #[default]
    Null,
}

/// Where NULL values go when ordering cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nulls {
    First,
    #[default]
    Last,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Int(_) | CellValue::Float(_) => 1,
            CellValue::String(_) => 2,
            CellValue::Null => 3,
        }
    }

    /// Total ordering over cell values.
    ///
    /// Numbers compare by exact numeric value regardless of `Int`/`Float`,
    /// strings lexicographically and bools with `false < true`. Every NaN,
    /// whatever its sign, sorts after all other numbers and equal to other
    /// NaNs; `-0.0` equals `0.0`. Values of different kinds are ordered by
    /// kind (bool, number, string) so the result is always deterministic.
    pub fn compare(&self, other: &CellValue, nulls: Nulls) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => {
                return match nulls {
                    Nulls::First => Ordering::Less,
                    Nulls::Last => Ordering::Greater,
                };
            }
            (false, true) => {
                return match nulls {
                    Nulls::First => Ordering::Greater,
                    Nulls::Last => Ordering::Less,
                };
            }
            (false, false) => {}
        }

        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => compare_floats(*a, *b),
            (CellValue::Int(a), CellValue::Float(b)) => compare_int_float(*a, *b),
            (CellValue::Float(a), CellValue::Int(b)) => compare_int_float(*b, *a).reverse(),
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }
}

/// NaN is greater than every number and equal to itself.
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an integer with a float, without widening the
/// integer to `f64`.
fn compare_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, the first float above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() || f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let floor = f.floor();
    match (i as i128).cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Ordering::Less,
        other => other,
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(v) => write!(f, "{}", v),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::String(v) => f.write_str(v),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        CellValue::Int(v as i64)
    }
}

impl From<f32> for CellValue {
    fn from(v: f32) -> Self {
        CellValue::Float(v as f64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}
