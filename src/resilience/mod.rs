//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Handler execution:
//!     → fault_boundary.rs (catch panics while polling, capture panic site)
//!     → Ok(output) or Err(Fault) to the recovery middleware
//! Request deadline:
//!     → tower_http TimeoutLayer installed by the HTTP server
//! ```
//!
//! # Design Decisions
//! - Panics are turned into values at one boundary, never propagated
//! - The boundary itself must not panic, whatever the payload
//! - Timeouts are non-negotiable; every request has a deadline

pub mod fault_boundary;

pub use fault_boundary::Fault;
