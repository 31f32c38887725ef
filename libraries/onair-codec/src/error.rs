//! Error types for decoding and encoding

use onair_core::{OnairError, OutputFormat};
use onair_dsp::DspError;
use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised by decoders and encoders
#[derive(Error, Debug)]
pub enum CodecError {
    /// Input is malformed, unsupported, or has no audio track
    #[error("Decode error: {0}")]
    Decode(String),

    /// Encoder ran and failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Encoder cannot run in this environment
    #[error("{format} encoder unavailable: {reason}")]
    EncoderUnavailable {
        /// Requested output format
        format: OutputFormat,
        /// Why the encoder cannot run
        reason: String,
    },

    /// Decoded samples could not be normalized
    #[error(transparent)]
    Samples(#[from] DspError),

    /// I/O errors (temporary files, external processes)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub(crate) fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

impl From<symphonia::core::errors::Error> for CodecError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<hound::Error> for CodecError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => Self::Io(io),
            other => Self::Encode(other.to_string()),
        }
    }
}

impl From<CodecError> for OnairError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode(msg) => OnairError::Decode(msg),
            CodecError::Encode(msg) => OnairError::Encode(msg),
            unavailable @ CodecError::EncoderUnavailable { .. } => {
                OnairError::Encode(unavailable.to_string())
            }
            CodecError::Samples(dsp) => dsp.into(),
            CodecError::Io(io) => OnairError::Io(io),
        }
    }
}
