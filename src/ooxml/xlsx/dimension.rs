//! Used-range and row-span bookkeeping for worksheets.

use std::collections::BTreeMap;
use std::fmt;

use crate::common::{Error, Result};

use super::coordinate::{encode, is_valid};

/// Bounding rectangle of every cell written to a worksheet.
///
/// The rectangle only ever grows. Overwriting a cell (even with a blank)
/// does not recompute it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimension {
    /// (min_row, min_col, max_row, max_col), `None` until the first write
    bounds: Option<(u32, u32, u32, u32)>,
}

impl Dimension {
    /// Create an empty dimension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand the rectangle to include (row, col).
    pub fn update(&mut self, row: u32, col: u32) -> Result<()> {
        if !is_valid(row, col) {
            return Err(Error::InvalidCoordinate { row, column: col });
        }

        self.bounds = Some(match self.bounds {
            None => (row, col, row, col),
            Some((min_row, min_col, max_row, max_col)) => (
                min_row.min(row),
                min_col.min(col),
                max_row.max(row),
                max_col.max(col),
            ),
        });

        Ok(())
    }

    /// Get the bounds as (min_row, min_col, max_row, max_col).
    /// Returns None if nothing has been written.
    pub fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Reference-range string for the `dimension` element.
    ///
    /// `A1` when empty, otherwise `min:max` such as `A5:C10`.
    pub fn compose(&self) -> String {
        match self.bounds {
            None => "A1".to_string(),
            Some((min_row, min_col, max_row, max_col)) => {
                format!("{}:{}", encode(min_row, min_col), encode(max_row, max_col))
            },
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}

/// Occupied column range of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub min_col: u32,
    pub max_col: u32,
}

impl fmt::Display for RowSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.min_col, self.max_col)
    }
}

/// Row number to occupied column range, for rows with at least one cell.
///
/// Always built from scratch out of the current grid; a value computed
/// before a write says nothing about the grid after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSpans {
    spans: BTreeMap<u32, RowSpan>,
}

impl RowSpans {
    /// Derive spans from occupied (row, col) keys in any order.
    pub fn calculate<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut spans: BTreeMap<u32, RowSpan> = BTreeMap::new();

        for (row, col) in keys {
            spans
                .entry(row)
                .and_modify(|span| {
                    span.min_col = span.min_col.min(col);
                    span.max_col = span.max_col.max(col);
                })
                .or_insert(RowSpan {
                    min_col: col,
                    max_col: col,
                });
        }

        Self { spans }
    }

    /// Span of a row, if it has any cells.
    pub fn get(&self, row: u32) -> Option<RowSpan> {
        self.spans.get(&row).copied()
    }

    /// Formatted `min:max` span attribute of a row.
    pub fn span(&self, row: u32) -> Option<String> {
        self.get(row).map(|s| s.to_string())
    }

    /// Rows in ascending order with their spans.
    pub fn iter(&self) -> impl Iterator<Item = (u32, RowSpan)> + '_ {
        self.spans.iter().map(|(&row, &span)| (row, span))
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dimension_composes_default() {
        let dim = Dimension::new();
        assert!(dim.is_empty());
        assert_eq!(dim.compose(), "A1");
    }

    #[test]
    fn test_dimension_grows() {
        let mut dim = Dimension::new();
        dim.update(5, 3).unwrap();
        assert_eq!(dim.compose(), "C5:C5");
        dim.update(10, 1).unwrap();
        assert_eq!(dim.compose(), "A5:C10");
        assert_eq!(dim.bounds(), Some((5, 1, 10, 3)));
    }

    #[test]
    fn test_dimension_rejects_invalid() {
        let mut dim = Dimension::new();
        dim.update(2, 2).unwrap();
        assert!(dim.update(0, 2).is_err());
        assert!(dim.update(2, 16_385).is_err());
        assert_eq!(dim.bounds(), Some((2, 2, 2, 2)));
    }

    #[test]
    fn test_spans_ignore_gaps() {
        let spans = RowSpans::calculate([(1, 5), (1, 2), (1, 9), (4, 3)]);
        assert_eq!(spans.span(1).as_deref(), Some("2:9"));
        assert_eq!(spans.span(4).as_deref(), Some("3:3"));
        assert_eq!(spans.span(2), None);
        assert_eq!(spans.iter().map(|(r, _)| r).collect::<Vec<_>>(), vec![1, 4]);
    }
}
