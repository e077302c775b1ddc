//! Office Open XML (OOXML) format implementation.
//!
//! Only the spreadsheet worksheet model lives here; see [`xlsx`].

pub mod xlsx;
