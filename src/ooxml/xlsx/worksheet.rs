//! Worksheet implementation for Excel files.
//!
//! A [`Worksheet`] is a sparse grid of [`Cell`]s keyed by (row, column),
//! together with its used-range [`Dimension`] and a handle to the document's
//! [`SharedStringTable`]. XML composition lives in `writer::sheet`, parsing in
//! `parsers::worksheet_parser`.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::common::{Error, Result};
use crate::sheet::{CellType, CellValue, determine_type};

use super::cell::Cell;
use super::coordinate::{Coordinate, decode, is_valid};
use super::dimension::{Dimension, RowSpans};
use super::shared_strings::SharedStringTable;
use super::sheet_format::SheetFormatProps;

/// Axis a bulk write advances along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Fill consecutive columns of one row
    Row,
    /// Fill consecutive rows of one column
    Column,
}

/// A single worksheet of a workbook.
#[derive(Debug)]
pub struct Worksheet {
    /// Worksheet name
    pub(super) name: String,
    /// Sheet ID
    pub(super) sheet_id: u32,
    /// Cell data (row, col) -> cell
    pub(super) cells: HashMap<(u32, u32), Cell>,
    /// Bounding rectangle of every written cell
    pub(super) dimension: Dimension,
    /// Document-wide string table
    pub(super) shared_strings: SharedStringTable,
    /// Row/column defaults
    pub(super) sheet_format_props: SheetFormatProps,
}

impl Worksheet {
    /// Create a new empty worksheet that interns strings into `shared_strings`.
    pub fn new(name: impl Into<String>, sheet_id: u32, shared_strings: SharedStringTable) -> Self {
        Self {
            name: name.into(),
            sheet_id,
            cells: HashMap::new(),
            dimension: Dimension::new(),
            shared_strings,
            sheet_format_props: SheetFormatProps::default(),
        }
    }

    /// Get the worksheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the worksheet name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the sheet ID.
    pub fn sheet_id(&self) -> u32 {
        self.sheet_id
    }

    /// Handle to the shared string table this sheet interns into.
    pub fn shared_strings(&self) -> &SharedStringTable {
        &self.shared_strings
    }

    pub fn sheet_format_props(&self) -> &SheetFormatProps {
        &self.sheet_format_props
    }

    pub fn set_sheet_format_props(&mut self, props: SheetFormatProps) {
        self.sheet_format_props = props;
    }

    /// Write a value to a cell.
    ///
    /// Fails without touching the sheet if the coordinate is out of range or
    /// the value has no cell type. The last write to a coordinate wins.
    pub fn write(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> Result<()> {
        if !is_valid(row, col) {
            warn!(row, col, "rejected write outside worksheet bounds");
            return Err(Error::InvalidCoordinate { row, column: col });
        }

        let value = value.into();
        let cell_type = determine_type(&value);
        if cell_type == CellType::Unknown {
            warn!(row, col, kind = value.kind(), "rejected unrepresentable value");
            return Err(Error::UnrepresentableType(value.kind()));
        }

        self.dimension.update(row, col)?;
        self.store(row, col, value, cell_type);
        Ok(())
    }

    /// Write a value at a coordinate.
    pub fn write_at(&mut self, coordinate: Coordinate, value: impl Into<CellValue>) -> Result<()> {
        self.write(coordinate.row, coordinate.column, value)
    }

    /// Write a value at an A1-style reference such as `"B7"`.
    pub fn write_ref(&mut self, reference: &str, value: impl Into<CellValue>) -> Result<()> {
        let (row, col) = decode(reference).inspect_err(|_| {
            warn!(reference, "rejected write to malformed reference");
        })?;
        self.write(row, col, value)
    }

    /// Write values into consecutive columns of `row`, starting at `col`.
    ///
    /// Both ends of the run must be inside the worksheet or nothing is
    /// written. Inside the run, values with no cell type are skipped: their
    /// position stays empty and the remaining values are still written.
    pub fn write_row<I>(&mut self, row: u32, col: u32, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<CellValue>,
        I::IntoIter: ExactSizeIterator,
    {
        self.write_sequence(row, col, values, Direction::Row)
    }

    /// Write values into consecutive rows of `col`, starting at `row`.
    ///
    /// Same rules as [`Worksheet::write_row`].
    pub fn write_column<I>(&mut self, row: u32, col: u32, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<CellValue>,
        I::IntoIter: ExactSizeIterator,
    {
        self.write_sequence(row, col, values, Direction::Column)
    }

    fn write_sequence<I>(&mut self, row: u32, col: u32, values: I, direction: Direction) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<CellValue>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let len = values.len();

        if len == 0 {
            warn!(row, col, ?direction, "rejected empty bulk write");
            return Err(Error::EmptySequence);
        }
        if !is_valid(row, col) {
            warn!(row, col, ?direction, "rejected bulk write outside worksheet bounds");
            return Err(Error::InvalidCoordinate { row, column: col });
        }

        let offset = u32::try_from(len - 1).unwrap_or(u32::MAX);
        let (end_row, end_col) = match direction {
            Direction::Row => (row, col.saturating_add(offset)),
            Direction::Column => (row.saturating_add(offset), col),
        };
        if !is_valid(end_row, end_col) {
            warn!(end_row, end_col, len, ?direction, "bulk write runs past worksheet bounds");
            return Err(Error::InvalidCoordinate {
                row: end_row,
                column: end_col,
            });
        }

        self.dimension.update(row, col)?;
        self.dimension.update(end_row, end_col)?;

        for (i, value) in values.take(len).enumerate() {
            let step = i as u32;
            let (r, c) = match direction {
                Direction::Row => (row, col + step),
                Direction::Column => (row + step, col),
            };

            let value = value.into();
            let cell_type = determine_type(&value);
            if cell_type == CellType::Unknown {
                debug!(row = r, col = c, kind = value.kind(), "skipped unrepresentable value");
                continue;
            }
            self.store(r, c, value, cell_type);
        }

        Ok(())
    }

    /// Mark a cell as present but empty.
    pub fn write_blank(&mut self, row: u32, col: u32) -> Result<()> {
        if !is_valid(row, col) {
            warn!(row, col, "rejected blank write outside worksheet bounds");
            return Err(Error::InvalidCoordinate { row, column: col });
        }

        self.dimension.update(row, col)?;
        self.cells.insert((row, col), Cell::Blank);
        Ok(())
    }

    /// Intern (for strings) and insert a value whose type is already known.
    fn store(&mut self, row: u32, col: u32, value: CellValue, cell_type: CellType) {
        let shared_index = match (&value, cell_type) {
            (CellValue::String(s), CellType::SharedString) => {
                Some(self.shared_strings.intern(s, row, col))
            },
            _ => None,
        };

        if let Some(cell) = Cell::from_value(&value, shared_index) {
            self.cells.insert((row, col), cell);
        }
    }

    /// Read the value of a cell.
    ///
    /// Unwritten and out-of-range coordinates read as [`CellValue::Empty`].
    pub fn read(&self, row: u32, col: u32) -> CellValue {
        match self.cells.get(&(row, col)) {
            Some(cell) => cell.to_value(|index| self.shared_strings.get(index)),
            None => CellValue::Empty,
        }
    }

    /// Read the value at a coordinate.
    pub fn read_at(&self, coordinate: Coordinate) -> CellValue {
        self.read(coordinate.row, coordinate.column)
    }

    /// Read the value at an A1-style reference. Malformed references read as empty.
    pub fn read_ref(&self, reference: &str) -> CellValue {
        match decode(reference) {
            Ok((row, col)) => self.read(row, col),
            Err(_) => CellValue::Empty,
        }
    }

    /// Raw stored cell at a coordinate.
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Check whether a coordinate holds a cell (blank cells included).
    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.cells.contains_key(&(row, col))
    }

    /// Get the number of stored cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Used-range tracker.
    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    /// Expand the used range to include (row, col) without writing a cell.
    pub fn update_dimension(&mut self, row: u32, col: u32) -> Result<()> {
        self.dimension.update(row, col)
    }

    /// Reference range for the `dimension` element, e.g. `A5:C10`.
    pub fn compose_dimension(&self) -> String {
        self.dimension.compose()
    }

    /// Derive every row's occupied column span from the current grid.
    pub fn calculate_spans(&self) -> RowSpans {
        RowSpans::calculate(self.cells.keys().copied())
    }

    /// Cells in row-major order (ascending row, then ascending column).
    pub fn sorted_cells(&self) -> Vec<((u32, u32), &Cell)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(&k, v)| (k, v)).collect();
        cells.sort_unstable_by_key(|&(key, _)| key);
        cells
    }
}
