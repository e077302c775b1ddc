//! Cell storage for Excel worksheets.
//!
//! A [`Cell`] is what the worksheet grid keeps per occupied coordinate. The
//! variant is the cell's type tag; string cells only hold their index into
//! the shared string table.

use chrono::NaiveDateTime;

use crate::sheet::{CellType, CellValue};

/// Largest magnitude at which every integer is exactly representable in an f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A single grid entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Numeric value (all integer and float kinds)
    Number(f64),
    /// Boolean value
    Boolean(bool),
    /// Date/time value
    Date(NaiveDateTime),
    /// Index into the shared string table
    SharedString(u32),
    /// Present but empty
    Blank,
}

impl Cell {
    /// The type tag of this cell.
    pub fn cell_type(&self) -> CellType {
        match self {
            Cell::Number(_) => CellType::Number,
            Cell::Boolean(_) => CellType::Boolean,
            Cell::Date(_) => CellType::Date,
            Cell::SharedString(_) => CellType::SharedString,
            Cell::Blank => CellType::Blank,
        }
    }

    /// Build a cell from a value whose type has already been inferred.
    ///
    /// `shared_index` is only consulted for string values. Returns `None` for
    /// kinds with no storage representation.
    pub(crate) fn from_value(value: &CellValue, shared_index: Option<u32>) -> Option<Self> {
        match value {
            CellValue::Int(i) => Some(Cell::Number(*i as f64)),
            CellValue::Float(f) => Some(Cell::Number(*f)),
            CellValue::Bool(b) => Some(Cell::Boolean(*b)),
            CellValue::DateTime(dt) => Some(Cell::Date(*dt)),
            CellValue::String(_) => shared_index.map(Cell::SharedString),
            CellValue::Empty | CellValue::Error(_) => None,
        }
    }

    /// Convert to a caller-facing value.
    ///
    /// `resolve` maps a shared string index to its text. Integral numbers that
    /// an f64 holds exactly come back as [`CellValue::Int`].
    pub(crate) fn to_value(&self, resolve: impl FnOnce(u32) -> Option<String>) -> CellValue {
        match self {
            Cell::Number(n) => number_value(*n),
            Cell::Boolean(b) => CellValue::Bool(*b),
            Cell::Date(dt) => CellValue::DateTime(*dt),
            Cell::SharedString(index) => resolve(*index)
                .map(CellValue::String)
                .unwrap_or(CellValue::Empty),
            Cell::Blank => CellValue::Empty,
        }
    }
}

fn number_value(n: f64) -> CellValue {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT {
        CellValue::Int(n as i64)
    } else {
        CellValue::Float(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_type_follows_variant() {
        assert_eq!(Cell::Number(1.0).cell_type(), CellType::Number);
        assert_eq!(Cell::Boolean(false).cell_type(), CellType::Boolean);
        assert_eq!(Cell::SharedString(0).cell_type(), CellType::SharedString);
        assert_eq!(Cell::Blank.cell_type(), CellType::Blank);
    }

    #[test]
    fn test_number_read_back() {
        let none = |_| None;
        assert_eq!(Cell::Number(42.0).to_value(none), CellValue::Int(42));
        assert_eq!(Cell::Number(-3.5).to_value(none), CellValue::Float(-3.5));
        assert_eq!(Cell::Number(1e300).to_value(none), CellValue::Float(1e300));
    }

    #[test]
    fn test_shared_string_resolution() {
        let cell = Cell::SharedString(3);
        let value = cell.to_value(|i| (i == 3).then(|| "three".to_string()));
        assert_eq!(value, CellValue::String("three".into()));
        assert_eq!(Cell::SharedString(9).to_value(|_| None), CellValue::Empty);
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Cell::from_value(&7.into(), None), Some(Cell::Number(7.0)));
        assert_eq!(Cell::from_value(&"s".into(), Some(2)), Some(Cell::SharedString(2)));
        assert_eq!(Cell::from_value(&CellValue::Empty, None), None);
    }
}
