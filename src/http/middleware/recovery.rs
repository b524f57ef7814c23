//! Panic recovery.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::request::RequestInfo;
use crate::http::response::internal_error;
use crate::resilience::fault_boundary::{self, Fault};

/// Run the rest of the chain inside a fault boundary.
///
/// A panic is logged with full context, marked on the request span, and
/// answered with the fixed 500 body. The panic message never reaches the
/// client.
pub async fn recover_panics(request: Request, next: Next) -> Response {
    let info = RequestInfo::from_request(&request);

    match fault_boundary::run(next.run(request)).await {
        Ok(response) => response,
        Err(fault) => {
            report(&info, &fault);
            internal_error(info.trace_id())
        }
    }
}

fn report(info: &RequestInfo, fault: &Fault) {
    let error = fault.error();

    tracing::error!(
        panic = %fault.raw(),
        error = %error,
        code = %error.code(),
        method = %info.method,
        path = %info.path,
        trace_id = %info.trace_id_field(),
        location = fault.location(),
        stacktrace = %fault.stack(),
        "panic recovered"
    );

    if let Some(trace) = &info.trace {
        trace.record_error(&error.to_string());
    }
}
