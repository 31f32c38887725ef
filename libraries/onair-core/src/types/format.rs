/// Output container formats
use crate::error::OnairError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Container/codec a mastered buffer can be written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 16-bit PCM WAV (always available)
    #[default]
    Wav,
    /// MP3 at 320 kbps (requires an external encoder)
    Mp3,
}

impl OutputFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
        }
    }

    /// MIME type for HTTP responses
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "audio/wav",
            OutputFormat::Mp3 => "audio/mpeg",
        }
    }

    /// Every known format
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Wav, OutputFormat::Mp3]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = OnairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wav" | "wave" => Ok(Self::Wav),
            "mp3" | "mpeg" => Ok(Self::Mp3),
            other => Err(OnairError::encode(format!(
                "unknown output format '{}' (expected wav or mp3)",
                other
            ))),
        }
    }
}
