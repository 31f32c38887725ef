//! Error types for the mastering chain

use thiserror::Error;

/// Result type for mastering operations
pub type Result<T> = std::result::Result<T, DspError>;

/// Errors that can occur while normalizing or mastering audio
///
/// Only malformed structural input or configuration is an error. Numeric edge
/// cases (silence, zero peak, non-finite samples) are handled in-band and
/// reported as [`MasteringNotice`](crate::MasteringNotice)s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    /// Sample encoding is not a recognized integer or floating type
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Channel count or interleaving cannot be interpreted
    #[error("Unsupported channel layout: {0}")]
    UnsupportedChannelLayout(String),

    /// Out-of-range or non-finite configuration
    #[error("Invalid mastering configuration: {0}")]
    Config(String),

    /// Buffer violates a structural invariant
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),
}

impl DspError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<DspError> for onair_core::OnairError {
    fn from(err: DspError) -> Self {
        match err {
            DspError::UnsupportedFormat(msg) => Self::UnsupportedFormat(msg),
            DspError::UnsupportedChannelLayout(msg) => Self::UnsupportedChannelLayout(msg),
            DspError::Config(msg) => Self::Config(msg),
            DspError::InvalidBuffer(msg) => Self::InvalidBuffer(msg),
        }
    }
}

impl From<onair_core::OnairError> for DspError {
    fn from(err: onair_core::OnairError) -> Self {
        use onair_core::OnairError;

        match err {
            OnairError::UnsupportedFormat(msg) => Self::UnsupportedFormat(msg),
            OnairError::UnsupportedChannelLayout(msg) => Self::UnsupportedChannelLayout(msg),
            OnairError::Config(msg) => Self::Config(msg),
            other => Self::InvalidBuffer(other.to_string()),
        }
    }
}
