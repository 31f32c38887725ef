/// Core error types for Onair
use thiserror::Error;

/// Result type alias using `OnairError`
pub type Result<T> = std::result::Result<T, OnairError>;

/// Core error type for Onair
///
/// Library crates keep their own error enums and convert into this one at
/// crate boundaries.
#[derive(Error, Debug)]
pub enum OnairError {
    /// Malformed or unsupported input container or sample encoding
    #[error("Decode error: {0}")]
    Decode(String),

    /// Requested output codec failed or is unavailable
    #[error("Encode error: {0}")]
    Encode(String),

    /// Sample encoding not recognized as an integer or floating type
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Channel count or layout cannot be interpreted
    #[error("Unsupported channel layout: {0}")]
    UnsupportedChannelLayout(String),

    /// Out-of-range or non-finite configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structurally invalid audio buffer
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OnairError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an encode error
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid buffer error
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }
}
