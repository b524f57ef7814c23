//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → tracing.rs (spans with correlation IDs)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON in production)
//!     → Distributed tracing (optional, via `otel.*` span fields)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Trace ID flows through request extensions, response header and logs
//! - Components log through the `tracing` dispatcher, so tests swap in a
//!   recording subscriber instead of a real backend

pub mod logging;
pub mod tracing;

pub use self::tracing::{TraceContext, TraceId, X_TRACE_ID};
