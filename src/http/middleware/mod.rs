//! Request interceptors.
//!
//! # Data Flow
//! ```text
//! Request
//!     → real_ip.rs      (client IP from proxy headers)
//!     → trace.rs        (assign trace id, open span, echo x-trace-id)
//!     → request_log.rs  (time the request, log final status)
//!     → recovery.rs     (fault boundary around everything below)
//!     → timeout         (tower_http, per-request deadline)
//!     → handlers
//! ```
//!
//! # Design Decisions
//! - Plain `axum::middleware::from_fn` functions, composed in `server.rs`
//! - The request logger sits outside recovery so a recovered panic is
//!   still logged once, with status 500

pub mod real_ip;
pub mod recovery;
pub mod request_log;
pub mod trace;

pub use real_ip::{resolve_real_ip, RealIp};
pub use recovery::recover_panics;
pub use request_log::log_requests;
pub use trace::propagate_trace;
