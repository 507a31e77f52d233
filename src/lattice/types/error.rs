//! Custom error types for the lattice-reader crate.

use thiserror::Error;

/// Coarse classification of a [`LatticeError`].
///
/// Lets callers tell a structurally broken file apart from a file that
/// simply does not match the shape they declared for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The container is malformed (bad magic, truncated record, missing record, bad XML).
    Format,
    /// The container is well formed but disagrees with the declared element metadata.
    Validation,
    /// The declared element metadata itself is invalid (dtype or shape).
    Decoding,
    /// An index does not fit the layout it was applied to.
    Index,
    /// Passed through unmodified from the storage layer.
    Io,
}

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum LatticeError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The format descriptor record is not well-formed XML.
    #[error("XML error in format descriptor: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A record header does not start with the LIME magic sequence.
    #[error("Bad LIME magic at offset {offset}: found {found:02x?}")]
    BadMagic { offset: u64, found: [u8; 6] },

    /// The stream ended in the middle of a record.
    #[error("Truncated {context} at offset {offset}")]
    Truncated { context: &'static str, offset: u64 },

    /// The file is structurally invalid.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A record required to interpret the container is absent.
    #[error("Missing required record '{0}'")]
    MissingRecord(String),

    /// The descriptor's floating-point precision does not match the declared element width.
    #[error("Precision mismatch: {precision}-bit complex pairs cannot hold {element_bytes}-byte elements")]
    PrecisionMismatch { precision: u32, element_bytes: usize },

    /// A byte count does not match what the declared metadata implies.
    #[error("Size mismatch for {context}: expected {expected} bytes, but found {found} bytes")]
    SizeMismatch {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// The dtype code does not follow `[<>=]?[iufc]<width>` or names an unsupported width.
    #[error("Invalid dtype '{0}'")]
    InvalidDtype(String),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// A partial index must fix between one and `ndim` leading axes.
    #[error("Index of length {len} does not fit a {ndim}-dimensional layout")]
    InvalidIndex { len: usize, ndim: usize },

    #[error("Index {index} is out of bounds for axis {axis} with length {len}")]
    IndexOutOfBounds { axis: usize, index: usize, len: usize },
}

impl LatticeError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Xml(_)
            | Self::BadMagic { .. }
            | Self::Truncated { .. }
            | Self::InvalidFormat(_)
            | Self::MissingRecord(_) => ErrorKind::Format,
            Self::PrecisionMismatch { .. } | Self::SizeMismatch { .. } => ErrorKind::Validation,
            Self::InvalidDtype(_) | Self::InvalidShape(_) => ErrorKind::Decoding,
            Self::InvalidIndex { .. } | Self::IndexOutOfBounds { .. } => ErrorKind::Index,
        }
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// A convenience `Result` type alias using the crate's `LatticeError` type.
pub type Result<T> = std::result::Result<T, LatticeError>;
