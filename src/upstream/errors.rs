//! Upstream API Error Types
//!
//! Classifies failures talking to the weather API so the HTTP layer can
//! mirror the upstream status and message back to the browser.

use serde_json::Value;

/// Upstream API error types
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        /// `message` field of the upstream error payload, if it had one
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid upstream payload: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Create an UpstreamError from an HTTP status code and response body
    ///
    /// OpenWeather error bodies look like `{"cod":401,"message":"Invalid API key"}`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| value.get("message")?.as_str().map(str::to_string))
            .filter(|message| !message.is_empty());

        UpstreamError::Status { status, message }
    }

    /// HTTP status to hand back to the client
    ///
    /// Transport and decode failures have no upstream status and map to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Network(_) | UpstreamError::Decode(_) => 500,
        }
    }

    /// Message reported by the upstream service, if any
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}
