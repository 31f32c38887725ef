//! Codec collaborators for the Onair mastering chain
//!
//! - [`SymphoniaDecoder`]: uploads (WAV, FLAC, MP3, OGG/Vorbis, AAC/M4A) to
//!   an [`AudioBuffer`](onair_core::AudioBuffer), every channel preserved
//! - [`WavEncoder`]: 16-bit PCM WAV through `hound`
//! - [`FfmpegMp3Encoder`]: 320 kbps MP3 through an external `ffmpeg`
//! - [`EncoderRegistry`]: picks the encoder for an
//!   [`OutputFormat`](onair_core::OutputFormat) and reports unavailability
//!   instead of substituting another format
//!
//! # Example
//!
//! ```ignore
//! use onair_codec::{EncoderRegistry, SymphoniaDecoder};
//! use onair_core::OutputFormat;
//!
//! let buffer = SymphoniaDecoder::new().decode_bytes(&upload, Some("flac"))?;
//! let wav = EncoderRegistry::default().encode(&buffer, OutputFormat::Wav)?;
//! ```

#![forbid(unsafe_code)]

mod decoder;
mod encoder;
mod error;

pub use decoder::SymphoniaDecoder;
pub use encoder::{EncoderRegistry, FfmpegMp3Encoder, WavEncoder, MP3_BITRATE};
pub use error::{CodecError, Result};
