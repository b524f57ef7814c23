//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (accepted by axum::serve)
//!     → server.rs (router assembly, graceful serve)
//!     → middleware/ (trace → request log → recovery → timeout)
//!     → handlers.rs or a registered RouteRegistrar
//!     → response.rs (fixed error body on recovered failures)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestInfo, RequestTraceExt};
pub use response::{internal_error, ErrorBody, INTERNAL_ERROR_MESSAGE};
pub use server::{AppState, HttpServer, RouteRegistrar};
