//! Error types for diagram persistence and interchange.

use thiserror::Error;

/// Errors surfaced by the persistence gateway, the interchange service, and
/// the diagram API. A missing record is not represented here: gateway `get`
/// returns `Ok(None)` for an unknown id, and `NotFound` is only used where
/// the caller named a specific diagram that must exist.
#[derive(Error, Debug)]
pub enum DiagramError {
    /// Save payload failed validation
    #[error("Missing required fields: id, title")]
    MissingRequiredFields,

    /// A diagram the caller explicitly referenced does not exist
    #[error("Diagram {0} not found")]
    NotFound(String),

    /// Malformed interchange or storage document
    #[error("Invalid diagram document: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    /// Local storage I/O failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote diagram API could not be reached
    #[error("Diagram API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote diagram API answered with an error status
    #[error("Diagram API error ({status}): {message}")]
    Remote { status: u16, message: String },
}
