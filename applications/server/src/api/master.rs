/// Mastering API route
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use onair_codec::SymphoniaDecoder;
use onair_core::OutputFormat;
use onair_dsp::{master, MasteringConfig, MasteringResult};
use serde::Deserialize;

/// Multipart field names accepted for the upload
const UPLOAD_FIELDS: &[&str] = &["audio_file", "file"];

pub const APPLIED_GAIN_HEADER: &str = "x-onair-applied-gain-db";
pub const LOUDNESS_BEFORE_HEADER: &str = "x-onair-loudness-before";
pub const LOUDNESS_AFTER_HEADER: &str = "x-onair-loudness-after";
pub const PEAK_AFTER_HEADER: &str = "x-onair-peak-after";

/// Query parameters for POST /api/master
///
/// Kept as strings so malformed values produce the JSON error body rather
/// than the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct MasterQuery {
    pub format: Option<String>,
    pub target_lufs: Option<String>,
}

impl MasterQuery {
    fn output_format(&self) -> Result<OutputFormat> {
        match self.format.as_deref() {
            None | Some("") => Ok(OutputFormat::default()),
            Some(raw) => raw
                .parse()
                .map_err(|e: onair_core::OnairError| ServerError::BadRequest(e.to_string())),
        }
    }

    fn mastering_config(&self, defaults: &MasteringConfig) -> Result<MasteringConfig> {
        let mut config = *defaults;
        if let Some(raw) = self.target_lufs.as_deref().filter(|s| !s.is_empty()) {
            config.target_lufs = raw.trim().parse().map_err(|_| {
                ServerError::BadRequest(format!("target_lufs '{}' is not a number", raw))
            })?;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Uploaded file and its extension, if the filename carried one
struct Upload {
    data: Bytes,
    extension: Option<String>,
}

/// POST /api/master?format=wav|mp3&target_lufs=-14
///
/// Decodes the uploaded file, runs the mastering chain and returns the
/// encoded master as an attachment.
pub async fn master_upload(
    State(app_state): State<AppState>,
    Query(query): Query<MasterQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let format = query.output_format()?;
    let config = query.mastering_config(&app_state.config.mastering)?;

    // Fail before decoding if the requested encoder cannot run
    app_state.encoders.encoder_for(format)?;

    let upload = read_upload(&headers, body, app_state.config.limits.max_upload_mb).await?;
    tracing::info!(
        bytes = upload.data.len(),
        extension = upload.extension.as_deref().unwrap_or("?"),
        %format,
        target_lufs = config.target_lufs,
        "Mastering upload"
    );

    let encoders = app_state.encoders.clone();
    let (encoded, result) = tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, MasteringResult)> {
        let buffer = SymphoniaDecoder::new().decode_bytes(&upload.data, upload.extension.as_deref())?;
        let result = master(&buffer, &config)?;
        let encoded = encoders.encode(&result.buffer, format)?;
        Ok((encoded, result))
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Mastering task failed: {}", e)))??;

    for notice in &result.notices {
        tracing::info!(%notice, "Mastering notice");
    }

    build_response(encoded, format, &result)
}

/// Extract the audio file from a multipart/form-data body
async fn read_upload(headers: &HeaderMap, body: Bytes, limit_mb: usize) -> Result<Upload> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ServerError::BadRequest("Missing Content-Type".to_string()))?;

    if !content_type.starts_with("multipart/form-data") {
        return Err(ServerError::BadRequest(
            "Expected multipart/form-data".to_string(),
        ));
    }

    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ServerError::BadRequest("Missing boundary".to_string()))?;

    let constraints = multer::Constraints::new().size_limit(
        multer::SizeLimit::new().whole_stream((limit_mb as u64).saturating_mul(1024 * 1024)),
    );

    // Convert Bytes to a stream for multer
    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::with_constraints(stream, boundary, constraints);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit_mb))?
    {
        let name = field.name().unwrap_or("").to_string();
        if !UPLOAD_FIELDS.contains(&name.as_str()) {
            continue;
        }

        let extension = field.file_name().and_then(|filename| {
            std::path::Path::new(filename)
                .extension()
                .and_then(|e| e.to_str())
                .map(|s| s.to_lowercase())
        });
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit_mb))?;

        if data.is_empty() {
            return Err(ServerError::BadRequest("Uploaded file is empty".to_string()));
        }
        return Ok(Upload { data, extension });
    }

    Err(ServerError::BadRequest(
        "Missing file field 'audio_file'".to_string(),
    ))
}

fn multipart_error(err: multer::Error, limit_mb: usize) -> ServerError {
    match err {
        multer::Error::StreamSizeExceeded { .. } | multer::Error::FieldSizeExceeded { .. } => {
            ServerError::PayloadTooLarge { limit_mb }
        }
        other => ServerError::BadRequest(format!("Failed to parse multipart: {}", other)),
    }
}

fn build_response(encoded: Vec<u8>, format: OutputFormat, result: &MasteringResult) -> Result<Response> {
    let mut response = Response::new(Body::from(encoded));
    let headers = response.headers_mut();

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(format.mime_type()));
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(format!("attachment; filename=mastered.{}", format.extension()))?,
    );
    headers.insert(
        HeaderName::from_static(APPLIED_GAIN_HEADER),
        header_value(format!("{:.2}", result.applied_gain_db))?,
    );
    headers.insert(
        HeaderName::from_static(LOUDNESS_BEFORE_HEADER),
        header_value(format_lufs(result.loudness_before))?,
    );
    headers.insert(
        HeaderName::from_static(LOUDNESS_AFTER_HEADER),
        header_value(format_lufs(result.loudness_after))?,
    );
    headers.insert(
        HeaderName::from_static(PEAK_AFTER_HEADER),
        header_value(format!("{:.4}", result.peak_after))?,
    );

    Ok(response)
}

fn format_lufs(lufs: Option<f64>) -> String {
    match lufs {
        Some(value) => format!("{:.2}", value),
        None => "-inf".to_string(),
    }
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::try_from(value).map_err(|e| ServerError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(format: Option<&str>, target: Option<&str>) -> MasterQuery {
        MasterQuery {
            format: format.map(str::to_string),
            target_lufs: target.map(str::to_string),
        }
    }

    #[test]
    fn format_defaults_to_wav() {
        assert_eq!(query(None, None).output_format().unwrap(), OutputFormat::Wav);
        assert_eq!(query(Some("MP3"), None).output_format().unwrap(), OutputFormat::Mp3);
        assert!(matches!(
            query(Some("ogg"), None).output_format(),
            Err(ServerError::BadRequest(_))
        ));
    }

    #[test]
    fn target_overrides_defaults() {
        let defaults = MasteringConfig::default();
        let config = query(None, Some("-9.5")).mastering_config(&defaults).unwrap();
        assert_eq!(config.target_lufs, -9.5);
        assert_eq!(config.highpass_cutoff_hz, defaults.highpass_cutoff_hz);

        assert!(matches!(
            query(None, Some("loud")).mastering_config(&defaults),
            Err(ServerError::BadRequest(_))
        ));
        assert!(matches!(
            query(None, Some("NaN")).mastering_config(&defaults),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn silent_loudness_header() {
        assert_eq!(format_lufs(None), "-inf");
        assert_eq!(format_lufs(Some(-14.004)), "-14.00");
    }
}
