//! Request trace context.
//!
//! # Responsibilities
//! - Assign a correlation identity to every inbound request
//! - Open the request span named `<method> <path>`
//! - Carry both through request extensions by type, not by string key
//!
//! # Design Decisions
//! - The span closes when the last clone of the context is dropped, which
//!   happens after the response future completes or unwinds
//! - Span status is recorded through `otel.*` fields so an OpenTelemetry
//!   layer can export it; without one the fields are plain log context

use std::fmt;
use std::str::FromStr;

use axum::http::{HeaderName, Method};
use tracing::field::Empty;
use tracing::Span;
use uuid::Uuid;

/// Response header echoing the trace identity.
pub const X_TRACE_ID: HeaderName = HeaderName::from_static("x-trace-id");

/// Globally unique per-request correlation identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Trace identity plus the span it belongs to.
///
/// Inserted once into the request extensions by the trace middleware and
/// read, never replaced, by everything downstream.
#[derive(Debug, Clone)]
pub struct TraceContext {
    trace_id: TraceId,
    span: Span,
}

impl TraceContext {
    /// Assign a fresh identity and open the request span.
    pub fn start(method: &Method, path: &str) -> Self {
        let trace_id = TraceId::generate();
        let span = tracing::info_span!(
            "request",
            otel.name = %format!("{method} {path}"),
            otel.kind = "server",
            otel.status_code = Empty,
            otel.status_message = Empty,
            trace_id = %trace_id,
            http.method = %method,
            http.path = path,
        );
        Self { trace_id, span }
    }

    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Mark the span as failed. A disabled span ignores the call.
    pub fn record_error(&self, message: &str) {
        self.span.record("otel.status_code", "ERROR");
        self.span.record("otel.status_message", message);
    }
}
