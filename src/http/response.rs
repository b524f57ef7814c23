//! Fixed-shape error responses.
//!
//! # Responsibilities
//! - Render the client-visible body for recovered failures
//! - Keep internal detail out of the response; it lives only in the logs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::observability::TraceId;

/// Client-visible message for any unexpected failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// JSON body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub trace_id: String,
}

/// 500 with `{"error": "internal server error", "trace_id": <id>}`.
pub fn internal_error(trace_id: Option<TraceId>) -> Response {
    let body = ErrorBody {
        error: INTERNAL_ERROR_MESSAGE.to_string(),
        trace_id: trace_id.map(|id| id.to_string()).unwrap_or_default(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
