/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use onair_codec::CodecError;
use onair_core::OnairError;
use onair_dsp::DspError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upload exceeds {limit_mb} MiB")]
    PayloadTooLarge { limit_mb: usize },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OnairError> for ServerError {
    fn from(err: OnairError) -> Self {
        match err {
            OnairError::Decode(msg) => ServerError::Decode(msg),
            OnairError::Encode(msg) => ServerError::Encode(msg),
            OnairError::Config(msg) => ServerError::Config(msg),
            OnairError::UnsupportedFormat(_)
            | OnairError::UnsupportedChannelLayout(_)
            | OnairError::InvalidBuffer(_) => ServerError::Decode(err.to_string()),
            OnairError::Io(e) => ServerError::Io(e),
        }
    }
}

impl From<DspError> for ServerError {
    fn from(err: DspError) -> Self {
        OnairError::from(err).into()
    }
}

impl From<CodecError> for ServerError {
    fn from(err: CodecError) -> Self {
        OnairError::from(err).into()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad request", msg),
            ServerError::Decode(msg) => {
                tracing::warn!("Decode error: {}", msg);
                (StatusCode::BAD_REQUEST, "Could not decode audio", msg)
            }
            ServerError::Encode(msg) => {
                tracing::warn!("Encode error: {}", msg);
                (StatusCode::BAD_REQUEST, "Could not encode output", msg)
            }
            ServerError::Config(msg) => (StatusCode::BAD_REQUEST, "Invalid mastering parameters", msg),
            ref err @ ServerError::PayloadTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Upload too large",
                err.to_string(),
            ),
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    String::new(),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error", String::new())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "details": details,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        for err in [
            ServerError::BadRequest("x".into()),
            ServerError::Decode("x".into()),
            ServerError::Encode("x".into()),
            ServerError::Config("x".into()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn oversize_and_io_statuses() {
        let too_large = ServerError::PayloadTooLarge { limit_mb: 1 };
        assert_eq!(too_large.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);

        let io = ServerError::from(std::io::Error::other("disk"));
        assert_eq!(io.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn layout_errors_are_decode_errors() {
        let err = ServerError::from(DspError::UnsupportedChannelLayout("0 channels".into()));
        assert!(matches!(err, ServerError::Decode(_)));
    }
}
