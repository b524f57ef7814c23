//! Request completion logging.

use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Level;

use crate::http::request::RequestInfo;

/// Log severity for a final status: 5xx error, 4xx warn, otherwise info.
pub fn severity(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

/// Emit one `request completed` line after the inner chain has produced
/// the response.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let info = RequestInfo::from_request(&request);

    let response = next.run(request).await;

    record_completion(&info, response.status(), start.elapsed());
    response
}

fn record_completion(info: &RequestInfo, status: StatusCode, elapsed: Duration) {
    let trace_id = info.trace_id_field();

    macro_rules! completed {
        ($level:ident) => {
            tracing::$level!(
                method = %info.method,
                path = %info.path,
                status = status.as_u16(),
                remote_addr = %info.remote(),
                duration = ?elapsed,
                trace_id = %trace_id,
                "request completed"
            )
        };
    }

    match severity(status) {
        Level::ERROR => completed!(error),
        Level::WARN => completed!(warn),
        _ => completed!(info),
    }
}
