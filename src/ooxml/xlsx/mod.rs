//! Excel (.xlsx) worksheet model.
//!
//! This module holds the in-memory representation of a single worksheet and
//! its mapping to and from the worksheet XML part:
//!
//! - [`Worksheet`]: sparse cell grid with read/write API
//! - [`SharedStringTable`]: document-wide string pool shared by all sheets
//! - [`Dimension`] and [`RowSpans`]: used-range bookkeeping
//! - [`coordinate`]: A1-style reference codec
//!
//! Packaging the parts into a zip archive is left to the caller.
//!
//! # Example
//!
//! ```rust
//! use xlgrid::ooxml::xlsx::{SharedStringTable, Worksheet};
//!
//! let strings = SharedStringTable::new();
//! let mut sheet = Worksheet::new("Sheet1", 1, strings.clone());
//! sheet.write(5, 3, "hi")?;
//! sheet.write(10, 1, 42)?;
//! assert_eq!(sheet.compose_dimension(), "A5:C10");
//!
//! let xml = sheet.compose_xml()?;
//! let loaded = Worksheet::from_xml("Sheet1", 1, strings, xml.as_bytes())?;
//! assert_eq!(loaded.read_ref("C5").as_str(), Some("hi"));
//! # Ok::<(), xlgrid::Error>(())
//! ```

pub mod cell;
pub mod coordinate;
pub mod dimension;
pub mod parsers;
pub mod shared_strings;
pub mod sheet_format;
pub mod worksheet;
pub mod writer;


pub use cell::Cell;
pub use coordinate::{Coordinate, MAX_COLUMNS, MAX_ROWS};
pub use dimension::{Dimension, RowSpan, RowSpans};
pub use shared_strings::{SharedStringTable, SharedStrings};
pub use sheet_format::SheetFormatProps;
pub use worksheet::Worksheet;
