//! Onair Core
//!
//! Platform-agnostic types, codec traits, and error handling shared by the
//! mastering DSP, the codec collaborators, and the HTTP server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Audio Types**: `AudioBuffer`, `AudioFormat`, `SampleRate`, `OutputFormat`
//! - **Codec Traits**: `AudioDecoder`, `AudioEncoder`
//! - **Error Handling**: Unified `OnairError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use onair_core::{AudioBuffer, AudioFormat, SampleRate};
//!
//! // One second of stereo silence at 44.1 kHz
//! let format = AudioFormat::new(SampleRate::CD_QUALITY, 2, 16);
//! let buffer = AudioBuffer::try_new(vec![0.0; 88_200], format).unwrap();
//! assert_eq!(buffer.frames(), 44_100);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{OnairError, Result};
pub use traits::{AudioDecoder, AudioEncoder};
pub use types::{AudioBuffer, AudioFormat, OutputFormat, SampleRate};
