//! Error types for the unsheet library.

use std::io;
use thiserror::Error;

/// Result type alias for unsheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`].
///
/// Every error belongs to exactly one category, which tells the caller
/// whether the archive itself was unreadable, its content was malformed,
/// or the request addressed something that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive or one of its members could not be read.
    Io,
    /// A member was read but its content is malformed or inconsistent.
    Format,
    /// A worksheet index or name outside the workbook was requested.
    Range,
}

/// Errors that can occur while reading a spreadsheet.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// A required package member is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A member inflated to a different length than the archive records.
    #[error("Part {part} inflated to {actual} bytes, archive records {expected}")]
    SizeMismatch {
        part: String,
        expected: u64,
        actual: u64,
    },

    /// A member is larger than the configured ceiling.
    #[error("Part {part} is {size} bytes, limit is {limit}")]
    PartTooLarge { part: String, size: u64, limit: u64 },

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A cell reference or dimension could not be decoded.
    #[error("Invalid cell reference {reference:?}: {reason}")]
    InvalidReference { reference: String, reason: String },

    /// A cell points past the end of the shared string table.
    #[error("Shared string index {index} out of bounds (table has {len} entries)")]
    SharedStringIndex { index: usize, len: usize },

    /// A sheet declared in the workbook has no matching worksheet part.
    #[error("Sheet {sheet:?} cannot be resolved: {reason}")]
    UnresolvedSheet { sheet: String, reason: String },

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error serializing a decoded worksheet.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Worksheet index outside `[0, count)`.
    #[error("Worksheet index {index} out of range (workbook has {count} worksheets)")]
    WorksheetIndex { index: usize, count: usize },

    /// No worksheet carries the requested name.
    #[error("No worksheet named {0:?}")]
    WorksheetName(String),
}

impl Error {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_)
            | Error::ZipArchive(_)
            | Error::MissingPart(_)
            | Error::SizeMismatch { .. }
            | Error::PartTooLarge { .. } => ErrorKind::Io,
            Error::XmlParse(_)
            | Error::InvalidReference { .. }
            | Error::SharedStringIndex { .. }
            | Error::UnresolvedSheet { .. }
            | Error::InvalidData(_)
            | Error::Json(_) => ErrorKind::Format,
            Error::WorksheetIndex { .. } | Error::WorksheetName(_) => ErrorKind::Range,
        }
    }

    pub(crate) fn invalid_reference(reference: &str, reason: impl Into<String>) -> Self {
        Error::InvalidReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::ZipArchive(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for Error {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Error::XmlParse(err.to_string())
    }
}
