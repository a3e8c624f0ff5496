//! All error types for the droidtrans crate.
//!
//! These are returned from all fallible operations (parsing, serialization, directory I/O, etc.).
//! The reconciliation engine itself never fails; every error originates while reading or writing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A resource element could not be read: missing `name`, unexpected child, truncated input.
    #[error("malformed resource: {0}")]
    MalformedRecord(String),

    /// Two resources share a name. Aborts the whole collection parse.
    #[error("duplicate resource name `{0}`")]
    DuplicateName(String),

    /// An embedded source snapshot could not be decoded.
    #[error("provenance decode failure: {0}")]
    ProvenanceDecode(String),

    #[error("invalid sheet: {0}")]
    InvalidSheet(String),

    #[error("invalid language: {0}")]
    InvalidLanguage(String),

    #[error("directory not found: {0}")]
    MissingDirectory(String),
}

impl Error {
    /// Creates a new malformed record error
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedRecord(message.into())
    }

    /// Creates a new invalid sheet error
    pub fn invalid_sheet(message: impl Into<String>) -> Self {
        Error::InvalidSheet(message.into())
    }

    /// Whether this error must abort a multi-file parse instead of skipping the offending file.
    pub fn is_fatal_for_collection(&self) -> bool {
        matches!(self, Error::DuplicateName(_))
    }
}
