//! Unified error type for worksheet operations.
//!
//! Writes report coordinate and type failures synchronously; parsing reports
//! everything it cannot accept as a malformed document carrying the
//! underlying diagnostic.
use thiserror::Error;

/// Main error type for xlgrid operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Row or column outside the worksheet limits
    #[error("Invalid coordinate: row {row}, column {column}")]
    InvalidCoordinate { row: u32, column: u32 },

    /// Malformed A1-style reference string
    #[error("Invalid cell reference: {0:?}")]
    InvalidReference(String),

    /// Value kind that has no cell type mapping
    #[error("Unrepresentable cell value: {0}")]
    UnrepresentableType(&'static str),

    /// Bulk write called with no values
    #[error("Empty value sequence")]
    EmptySequence,

    /// XML not well-formed or not shaped like a worksheet part
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Error while formatting XML output
    #[error("XML write error: {0}")]
    XmlWrite(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error belongs to the invalid-coordinate class.
    pub fn is_invalid_coordinate(&self) -> bool {
        matches!(
            self,
            Error::InvalidCoordinate { .. } | Error::InvalidReference(_)
        )
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedDocument(msg.into())
    }
}

/// Result type for xlgrid operations.
pub type Result<T> = std::result::Result<T, Error>;
