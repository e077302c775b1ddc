//! XML text helpers shared by the part writers and parsers.

pub mod escape;

pub use escape::{escape_xml, needs_space_preserve, unescape_xml};
