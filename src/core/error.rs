use thiserror::Error;

/// Universal error type for metrics and rendering operations.
///
/// Replay never returns this type for cancellation or disposal; those are
/// normal outcomes reported through [`crate::rendering::ReplayOutcome`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PDFError {
    /// A `/W` glyph width array has the wrong shape or non-numeric members
    #[error("Malformed width table: {0}")]
    MalformedWidthTable(String),

    /// The device could not allocate what a draw call needed
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A dictionary value had an unexpected type
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    /// Device-level drawing failure
    #[error("Rendering error: {0}")]
    RenderingError(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for PDF operations
pub type PDFResult<T> = Result<T, PDFError>;
