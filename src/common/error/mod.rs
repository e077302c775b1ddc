//! Unified error types for xlgrid.
//!
//! This module provides the single error type returned by coordinate
//! decoding, worksheet writes and part parsing.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
