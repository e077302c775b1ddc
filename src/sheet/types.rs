//! Common types for spreadsheet operations.

use chrono::{NaiveDate, NaiveDateTime};

pub use crate::common::{Error, Result};

/// Types of data that can be stored in a cell.
///
/// This is the value handed to and returned from worksheet reads and writes.
/// `Empty` and `Error` have no cell type mapping and cannot be written.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value
    String(String),
    /// Date/time value
    DateTime(NaiveDateTime),
    /// Error value
    Error(String),
}

impl CellValue {
    /// Short name of the value kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Bool(_) => "bool",
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::String(_) => "string",
            CellValue::DateTime(_) => "datetime",
            CellValue::Error(_) => "error",
        }
    }

    /// Check if the value is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view of the value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Storage type of a cell, as recorded in the grid and the `t` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Number,
    Boolean,
    Date,
    SharedString,
    Blank,
    /// Sentinel for values that cannot be stored. Never persisted.
    Unknown,
}

/// Value kinds, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    String,
    Int,
    Float,
    Bool,
    DateTime,
}

/// Ordered source-kind to cell-type table.
///
/// Both the scalar and bulk write paths go through [`determine_type`], which
/// consults this table and nothing else.
const TYPE_MAP: [(ValueKind, CellType); 5] = [
    (ValueKind::String, CellType::SharedString),
    (ValueKind::Int, CellType::Number),
    (ValueKind::Float, CellType::Number),
    (ValueKind::Bool, CellType::Boolean),
    (ValueKind::DateTime, CellType::Date),
];

fn value_kind(value: &CellValue) -> Option<ValueKind> {
    match value {
        CellValue::String(_) => Some(ValueKind::String),
        CellValue::Int(_) => Some(ValueKind::Int),
        CellValue::Float(f) if f.is_finite() => Some(ValueKind::Float),
        CellValue::Bool(_) => Some(ValueKind::Bool),
        CellValue::DateTime(_) => Some(ValueKind::DateTime),
        // NaN and infinities have no worksheet representation.
        CellValue::Float(_) | CellValue::Empty | CellValue::Error(_) => None,
    }
}

/// Infer the cell type a value would be stored as.
///
/// Returns [`CellType::Unknown`] for kinds that have no mapping.
pub fn determine_type(value: &CellValue) -> CellType {
    let Some(kind) = value_kind(value) else {
        return CellType::Unknown;
    };

    TYPE_MAP
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|&(_, cell_type)| cell_type)
        .unwrap_or(CellType::Unknown)
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(v: $t) -> Self {
                    CellValue::Int(v as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, isize, u8, u16, u32);

impl From<u64> for CellValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => CellValue::Int(i),
            Err(_) => CellValue::Float(v as f64),
        }
    }
}

impl From<usize> for CellValue {
    fn from(v: usize) -> Self {
        CellValue::from(v as u64)
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

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        CellValue::DateTime(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::DateTime(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_type_table() {
        assert_eq!(determine_type(&"x".into()), CellType::SharedString);
        assert_eq!(determine_type(&42.into()), CellType::Number);
        assert_eq!(determine_type(&3.5.into()), CellType::Number);
        assert_eq!(determine_type(&true.into()), CellType::Boolean);

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(determine_type(&date.into()), CellType::Date);
    }

    #[test]
    fn test_unmapped_kinds_are_unknown() {
        assert_eq!(determine_type(&CellValue::Empty), CellType::Unknown);
        assert_eq!(
            determine_type(&CellValue::Error("#N/A".into())),
            CellType::Unknown
        );
        assert_eq!(determine_type(&Option::<i32>::None.into()), CellType::Unknown);
        assert_eq!(determine_type(&f64::NAN.into()), CellType::Unknown);
        assert_eq!(determine_type(&f64::INFINITY.into()), CellType::Unknown);
    }

    #[test]
    fn test_views() {
        assert_eq!(CellValue::Int(4).as_f64(), Some(4.0));
        assert_eq!(CellValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(CellValue::Bool(true).as_f64(), None);
        assert_eq!(CellValue::from("s").as_str(), Some("s"));
        assert_eq!(CellValue::Int(1).as_str(), None);
    }

    #[test]
    fn test_wide_unsigned_falls_back_to_float() {
        assert_eq!(CellValue::from(u64::MAX), CellValue::Float(u64::MAX as f64));
        assert_eq!(CellValue::from(7u64), CellValue::Int(7));
    }
}
