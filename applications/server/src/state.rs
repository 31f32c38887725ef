/// Shared application state
use crate::config::ServerConfig;
use onair_codec::EncoderRegistry;
use std::sync::Arc;

/// Application state shared across all handlers
///
/// Everything here is immutable; each request masters its own buffers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub encoders: Arc<EncoderRegistry>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let encoders = EncoderRegistry::new(config.encoder.ffmpeg_path.clone());
        Self {
            config: Arc::new(config),
            encoders: Arc::new(encoders),
        }
    }
}
