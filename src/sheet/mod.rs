//! Format-independent spreadsheet value types.
//!
//! [`CellValue`] is what callers write and read back; [`CellType`] is the
//! storage tag a value is inferred to, via [`determine_type`].

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{CellType, CellValue, Result, determine_type};
