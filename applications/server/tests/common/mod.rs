/// Common test utilities and fixtures
use onair_codec::WavEncoder;
use onair_core::{AudioBuffer, AudioFormat, SampleRate};
use onair_server::{config::ServerConfig, router, state::AppState};
use std::f64::consts::PI;

pub const BOUNDARY: &str = "onair-test-boundary";

/// Router with an ffmpeg path that cannot exist, so MP3 is never available
pub fn create_test_app(max_upload_mb: usize) -> axum::Router {
    let mut config = ServerConfig::default();
    config.limits.max_upload_mb = max_upload_mb;
    config.encoder.ffmpeg_path = "/nonexistent/onair/ffmpeg".into();
    router(AppState::new(config))
}

/// Stereo 997 Hz sine encoded as 16-bit WAV
pub fn sine_wav(amplitude: f64, secs: f64) -> Vec<u8> {
    let frames = (44_100.0 * secs) as usize;
    let mut samples = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let s = (amplitude * (2.0 * PI * 997.0 * i as f64 / 44_100.0).sin()) as f32;
        samples.push(s);
        samples.push(s);
    }
    let buffer = AudioBuffer::new(samples, AudioFormat::new(SampleRate::CD_QUALITY, 2, 16));
    WavEncoder::new().encode_bytes(&buffer).unwrap()
}

/// multipart/form-data body with a single file field
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
