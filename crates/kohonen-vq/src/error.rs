//! Error types for competitive-learning vector quantization

use thiserror::Error;

/// Errors that can occur while training, encoding or decoding
#[derive(Debug, Error)]
pub enum VqError {
    /// Invalid configuration: code count, sample set, block size or grid shape
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation called before the engine is ready for it
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Code index outside the codebook
    #[error("Code index {index} out of range for codebook of {num_codes} vectors")]
    InvalidIndex { index: usize, num_codes: usize },

    /// Serialized data could not be read back
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Result type for vector quantization operations
pub type Result<T> = std::result::Result<T, VqError>;
