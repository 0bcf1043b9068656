//! Error types for the PDF inverter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF inverter
#[derive(Error, Debug)]
pub enum Error {
    /// Path does not exist
    #[error("Path \"{}\" does not exist", .0.display())]
    PathNotFound(PathBuf),

    /// Path is neither a directory nor a `.pdf` file
    #[error("Please provide a valid PDF file or directory path: {}", .0.display())]
    InvalidInput(PathBuf),

    /// Bytes are not a PDF we can work with
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    /// Object graph access failed while rewriting pages
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error("{0}")]
    Unexpected(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PathNotFound,
    InvalidInput,
    Parse,
    Io,
    Unexpected,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PathNotFound(_) => ErrorKind::PathNotFound,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Io(_) => ErrorKind::Io,
            // A page graph that can't be walked was malformed on input
            Error::Pdf(_) => ErrorKind::Parse,
            Error::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}
