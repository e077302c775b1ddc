//! Worksheet XML composition for XLSX.

pub mod sheet;
