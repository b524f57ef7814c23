//! HTTP service scaffold with a traced, panic-safe request pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ http::server
//!                                          │
//!                      ┌───────────────────┴───────────────────┐
//!                      │  trace context  (x-trace-id, span)     │
//!                      │  request log    (one line per request) │
//!                      │  recovery       (panic → 500)          │
//!                      │  timeout                               │
//!                      └───────────────────┬───────────────────┘
//!                                          ▼
//!                                   route handlers ──▶ db pool
//!
//!     Cross-cutting: config, error taxonomy, observability,
//!     lifecycle (signals, drain, teardown)
//! ```

// Core subsystems
pub mod config;
pub mod db;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ServerConfig;
pub use error::{AppError, AppResult, ErrorCode};
pub use http::{AppState, HttpServer, RouteRegistrar};
pub use lifecycle::{Orchestrator, Running, Shutdown, ShutdownState};
