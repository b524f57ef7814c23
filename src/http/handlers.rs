//! Built-in routes.

use axum::http::StatusCode;

/// `GET /health`.
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /panic`: exercises the recovery path on purpose.
pub async fn simulate_panic() -> StatusCode {
    panic!("simulated crash")
}
