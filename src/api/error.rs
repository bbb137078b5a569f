use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Latitude and longitude are required")]
    MissingCoordinates,

    #[error("Search query is required")]
    MissingQuery,

    #[error("{fallback}: {source}")]
    Upstream {
        source: UpstreamError,
        /// Reported when the upstream payload carries no message
        fallback: &'static str,
    },
}

impl ApiError {
    pub fn upstream(source: UpstreamError, fallback: &'static str) -> Self {
        ApiError::Upstream { source, fallback }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCoordinates | ApiError::MissingQuery => StatusCode::BAD_REQUEST,
            ApiError::Upstream { source, .. } => StatusCode::from_u16(source.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Message shown to the client
    pub fn message(&self) -> String {
        match self {
            ApiError::Upstream { source, fallback } => source
                .upstream_message()
                .unwrap_or(*fallback)
                .to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
