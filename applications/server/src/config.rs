/// Server configuration
use crate::error::{Result, ServerError};
use onair_dsp::MasteringConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    /// Default mastering parameters; requests may override the target
    #[serde(default)]
    pub mastering: MasteringConfig,

    #[serde(default = "default_limits")]
    pub limits: LimitSettings,

    #[serde(default = "default_encoder")]
    pub encoder: EncoderSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitSettings {
    /// Largest accepted request body in MiB
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncoderSettings {
    /// ffmpeg executable used for MP3 output (looked up on PATH if bare)
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// Without an explicit path, `config.toml` in the working directory is
    /// used if present. `ONAIR_`-prefixed variables override file values,
    /// with `__` separating sections (`ONAIR_LIMITS__MAX_UPLOAD_MB=50`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ONAIR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_upload_mb == 0 {
            return Err(ServerError::Config(
                "limits.max_upload_mb must be at least 1".to_string(),
            ));
        }

        self.mastering
            .validate()
            .map_err(|e| ServerError::Config(format!("mastering defaults: {}", e)))?;

        Ok(())
    }

    /// Upload limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.limits.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_limits() -> LimitSettings {
    LimitSettings {
        max_upload_mb: default_max_upload_mb(),
    }
}

fn default_max_upload_mb() -> usize {
    100
}

fn default_encoder() -> EncoderSettings {
    EncoderSettings {
        ffmpeg_path: default_ffmpeg_path(),
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            mastering: MasteringConfig::default(),
            limits: default_limits(),
            encoder: default_encoder(),
        }
    }
}
