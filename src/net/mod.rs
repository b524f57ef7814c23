//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (bind, report local address)
//!     → TcpListener handed to the orchestrator's serve task
//! ```
//!
//! # Design Decisions
//! - Binding happens last in startup so traffic only arrives when ready
//! - Connection accounting is left to hyper's graceful shutdown

pub mod listener;

pub use listener::bind;
