//! Onair Server Library
//!
//! HTTP front end for the mastering chain: upload a track, get back a
//! loudness-normalized, peak-limited master as WAV or MP3.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod state;

// Re-export commonly used types for convenience
pub use api::router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;
