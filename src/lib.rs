//! xlgrid - An in-memory OOXML worksheet model
//!
//! This library keeps the cells of an Excel worksheet in a sparse grid and
//! maps that grid to and from the SpreadsheetML worksheet part
//! (`xl/worksheets/sheetN.xml`).
//!
//! # Features
//!
//! - **Sparse grid**: Cells keyed by (row, column), 1-based, within Excel's
//!   1,048,576 x 16,384 limits
//! - **Type inference**: Numbers, booleans, dates and strings map to a closed
//!   set of cell types; anything else is rejected
//! - **Shared strings**: One deduplicated string table per document, shared by
//!   every worksheet through a cloneable handle
//! - **Used range**: The `dimension` reference and per-row `spans` are kept
//!   in step with every write
//! - **Round trip**: Worksheets compose to XML and parse back to the same grid
//!
//! # Example - Writing a worksheet
//!
//! ```
//! use xlgrid::{CellValue, SharedStringTable, Worksheet};
//!
//! # fn main() -> Result<(), xlgrid::Error> {
//! let strings = SharedStringTable::new();
//! let mut sheet = Worksheet::new("Sheet1", 1, strings.clone());
//!
//! sheet.write_row(1, 1, ["Name", "Qty"])?;
//! sheet.write_row(2, 1, [CellValue::from("Apples"), CellValue::from(3)])?;
//!
//! assert_eq!(sheet.read(2, 2), CellValue::Int(3));
//! assert_eq!(sheet.compose_dimension(), "A1:B2");
//!
//! let sheet_xml = sheet.compose_xml()?;
//! let strings_xml = strings.compose_xml()?;
//! assert!(sheet_xml.contains(r#"<row r="2" spans="1:2">"#));
//! assert!(strings_xml.contains("<si><t>Apples</t></si>"));
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Loading a worksheet
//!
//! ```no_run
//! use xlgrid::{SharedStringTable, Worksheet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let strings = SharedStringTable::from_xml(&std::fs::read("sharedStrings.xml")?)?;
//! let sheet = Worksheet::from_xml("Data", 1, strings, &std::fs::read("sheet1.xml")?)?;
//!
//! println!("{} cells in {}", sheet.cell_count(), sheet.compose_dimension());
//! # Ok(())
//! # }
//! ```

/// Shared error type and XML helpers
pub mod common;

/// OOXML (Office Open XML) worksheet model
///
/// Grid, trackers, shared strings, and the worksheet part composer/parser.
pub mod ooxml;

/// Format-independent cell values and type inference
pub mod sheet;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use ooxml::xlsx::{Cell, Coordinate, Dimension, SharedStringTable, SheetFormatProps, Worksheet};
pub use sheet::{CellType, CellValue, determine_type};
