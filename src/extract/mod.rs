//! Structured-record extraction from persisted raw documents

pub mod driver;
pub mod parser;
pub mod record;

pub use driver::{extract_document, run_extraction, ExtractionSummary};
pub use parser::parse_record;
pub use record::{StructuredRecord, FIELD_NAMES};

use thiserror::Error;

/// Errors raised while deriving a structured record from a raw document
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A required page section or side-panel key was absent
    #[error("required field '{0}' not found in document")]
    MissingField(&'static str),

    /// A section was present but its content did not match the expected shape
    #[error("field '{field}' is malformed: {reason}")]
    MalformedField {
        field: &'static str,
        reason: String,
    },

    /// Reading the raw document or writing the record failed
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),
}
