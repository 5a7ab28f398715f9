use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures of a single heart-risk assessment request.
///
/// Every variant is reported to the caller the same way: HTTP 500 with a
/// `detail` message. Bad input and downstream outages are not told apart.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid symptom input: {0}")]
    InvalidInput(String),

    #[error("risk prediction failed: {0}")]
    Inference(String),

    #[error("generation API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mistral AI API error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed generation API response: {0}")]
    MalformedUpstream(String),
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": format!("An error occurred: {}", self) })),
        )
            .into_response()
    }
}
