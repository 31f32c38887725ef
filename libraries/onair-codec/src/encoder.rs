/// Output encoders: 16-bit WAV via hound, MP3 via an external ffmpeg
use crate::error::{CodecError, Result};
use onair_core::{AudioBuffer, AudioEncoder, OutputFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// MP3 bitrate passed to ffmpeg
pub const MP3_BITRATE: &str = "320k";

/// 16-bit PCM WAV encoder
///
/// Samples are clamped to [-1, 1] and scaled by 32767. Always available.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavEncoder;

impl WavEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    /// Encode a buffer into WAV bytes
    pub fn encode_bytes(&self, buffer: &AudioBuffer) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: buffer.format.channels,
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + buffer.len() * 2));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &buffer.samples {
                writer.write_sample(to_i16(sample))?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32_767.0) as i16
}

impl AudioEncoder for WavEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Wav
    }

    fn is_available(&self) -> bool {
        true
    }

    fn encode(&self, buffer: &AudioBuffer) -> onair_core::Result<Vec<u8>> {
        Ok(self.encode_bytes(buffer)?)
    }
}

/// MP3 encoder that shells out to ffmpeg
///
/// The buffer is written as 16-bit WAV to a temporary directory and
/// converted at 320 kbps. Availability is probed once with `ffmpeg -version`
/// and cached for the lifetime of the encoder.
#[derive(Debug)]
pub struct FfmpegMp3Encoder {
    ffmpeg_path: PathBuf,
    available: OnceLock<bool>,
}

impl FfmpegMp3Encoder {
    /// Create an encoder for the given ffmpeg executable
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            available: OnceLock::new(),
        }
    }

    /// Path of the ffmpeg executable
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    fn probe(&self) -> bool {
        let available = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);

        if available {
            tracing::debug!(path = %self.ffmpeg_path.display(), "ffmpeg found");
        } else {
            tracing::warn!(path = %self.ffmpeg_path.display(), "ffmpeg not available, MP3 output disabled");
        }
        available
    }

    /// Encode a buffer into MP3 bytes
    ///
    /// # Errors
    /// `EncoderUnavailable` when ffmpeg cannot be run, `Encode` when it exits
    /// with an error.
    pub fn encode_bytes(&self, buffer: &AudioBuffer) -> Result<Vec<u8>> {
        if !AudioEncoder::is_available(self) {
            return Err(CodecError::EncoderUnavailable {
                format: OutputFormat::Mp3,
                reason: format!("cannot run {}", self.ffmpeg_path.display()),
            });
        }

        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("master.wav");
        let output = workdir.path().join("master.mp3");
        std::fs::write(&input, WavEncoder.encode_bytes(buffer)?)?;

        let result = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y") // Overwrite output file
            .arg("-i")
            .arg(&input)
            .arg("-b:a")
            .arg(MP3_BITRATE)
            .arg("-f")
            .arg("mp3")
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(CodecError::encode(format!("ffmpeg failed: {}", stderr.trim())));
        }

        let bytes = std::fs::read(&output)?;
        tracing::debug!(bytes = bytes.len(), "Encoded MP3");
        Ok(bytes)
    }
}

impl Default for FfmpegMp3Encoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl AudioEncoder for FfmpegMp3Encoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Mp3
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| self.probe())
    }

    fn encode(&self, buffer: &AudioBuffer) -> onair_core::Result<Vec<u8>> {
        Ok(self.encode_bytes(buffer)?)
    }
}

/// Lookup of the encoder for each output format
#[derive(Debug)]
pub struct EncoderRegistry {
    wav: WavEncoder,
    mp3: FfmpegMp3Encoder,
}

impl EncoderRegistry {
    /// Registry using the given ffmpeg executable for MP3
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            wav: WavEncoder::new(),
            mp3: FfmpegMp3Encoder::new(ffmpeg_path),
        }
    }

    /// Encoder for a format
    ///
    /// # Errors
    /// `EncoderUnavailable` when the encoder cannot run here. Another format
    /// is never substituted.
    pub fn encoder_for(&self, format: OutputFormat) -> Result<&dyn AudioEncoder> {
        let encoder: &dyn AudioEncoder = match format {
            OutputFormat::Wav => &self.wav,
            OutputFormat::Mp3 => &self.mp3,
        };
        if encoder.is_available() {
            Ok(encoder)
        } else {
            Err(CodecError::EncoderUnavailable {
                format,
                reason: "encoder is not installed or cannot be executed".to_string(),
            })
        }
    }

    /// Encode a buffer in the requested format
    pub fn encode(&self, buffer: &AudioBuffer, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Wav => self.wav.encode_bytes(buffer),
            OutputFormat::Mp3 => {
                self.encoder_for(format)?;
                self.mp3.encode_bytes(buffer)
            }
        }
    }

    /// Formats that can currently be produced
    pub fn available_formats(&self) -> Vec<OutputFormat> {
        OutputFormat::all()
            .iter()
            .copied()
            .filter(|&format| self.encoder_for(format).is_ok())
            .collect()
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}
