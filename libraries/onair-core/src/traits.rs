/// Codec collaborator traits
use crate::error::Result;
use crate::types::{AudioBuffer, OutputFormat};

/// Audio decoder trait
///
/// Implementers turn an uploaded container (WAV, FLAC, MP3, ...) held in
/// memory into an `AudioBuffer`. The whole file is decoded at once.
pub trait AudioDecoder: Send {
    /// Decode a complete file from memory
    ///
    /// `extension_hint` is the original file extension, if known, and only
    /// helps format probing.
    ///
    /// # Errors
    /// Returns `OnairError::Decode` if the bytes are malformed or use an
    /// unsupported container or sample encoding
    fn decode(&mut self, bytes: &[u8], extension_hint: Option<&str>) -> Result<AudioBuffer>;

    /// Check if the decoder recognizes the given file extension
    fn supports_extension(&self, extension: &str) -> bool;
}

/// Audio encoder trait
///
/// Encoders are capability-checked: callers query [`AudioEncoder::is_available`]
/// before encoding and must surface an explicit error rather than silently
/// falling back to another format.
pub trait AudioEncoder: Send + Sync {
    /// Format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Whether the encoder can run in this environment
    fn is_available(&self) -> bool;

    /// Encode a buffer into container bytes
    ///
    /// # Errors
    /// Returns `OnairError::Encode` if the encoder is unavailable or fails
    fn encode(&self, buffer: &AudioBuffer) -> Result<Vec<u8>>;
}
