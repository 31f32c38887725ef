/// Core domain types
mod audio;
mod format;

pub use audio::{AudioBuffer, AudioFormat, SampleRate};
pub use format::OutputFormat;
