//! Trace context propagation.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::http::request::RequestTraceExt;
use crate::observability::{TraceContext, X_TRACE_ID};

/// Stamp a trace context on the request and run the rest of the chain
/// inside its span.
///
/// A request that already carries a context keeps it, so the identity is
/// assigned exactly once even if the layer is stacked twice.
pub async fn propagate_trace(mut request: Request, next: Next) -> Response {
    let ctx = match request.trace_context() {
        Some(existing) => existing.clone(),
        None => {
            let ctx = TraceContext::start(request.method(), request.uri().path());
            request.extensions_mut().insert(ctx.clone());
            ctx
        }
    };

    let mut response = next.run(request).instrument(ctx.span().clone()).await;

    if let Ok(value) = HeaderValue::from_str(&ctx.trace_id().to_string()) {
        response.headers_mut().insert(X_TRACE_ID, value);
    }
    response
}
