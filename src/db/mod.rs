//! Database subsystem.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig
//!     → pool.rs (connect, ping)
//!     → migrate.rs (apply pending migrations)
//!     → Arc<dyn ResourcePool> owned by the lifecycle orchestrator
//!     → shared by reference with handlers via AppState
//! ```
//!
//! # Design Decisions
//! - The orchestrator is the only caller of `close`, exactly once at teardown
//! - Handlers get a clone of the `Arc`, never ownership of the pool
//! - Boxed futures keep the trait object-safe so tests can substitute doubles

pub mod migrate;
pub mod pool;

use futures_util::future::BoxFuture;

use crate::error::AppError;

pub use migrate::run_migrations;
pub use pool::Database;

/// A shared resource with a liveness check and a one-shot release.
pub trait ResourcePool: Send + Sync + 'static {
    /// Verify the resource is reachable.
    fn ping(&self) -> BoxFuture<'_, Result<(), AppError>>;

    /// Release the resource. Called once, by the orchestrator.
    fn close(&self) -> BoxFuture<'_, ()>;
}
