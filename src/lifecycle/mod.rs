//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Env file → Logging → Config → Database → Migrations → Router → Bind
//!
//! Orchestration (orchestrator.rs):
//!     Serve task + driver task
//!     Signal or Shutdown::trigger → Drain (bounded) → Close pool → Stopped
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM/SIGQUIT → stop request
//!
//! Shutdown (shutdown.rs):
//!     Running → Draining → Stopped, observable by handlers
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: the listener is aborted after the deadline

pub mod orchestrator;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use orchestrator::{Orchestrator, Running};
pub use shutdown::{Shutdown, ShutdownState};
