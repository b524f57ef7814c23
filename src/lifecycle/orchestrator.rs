//! Process lifecycle orchestration.
//!
//! # Responsibilities
//! - Run the HTTP server on its own task
//! - Wait for a termination signal or an external stop request
//! - Drain in-flight requests within a fixed deadline
//! - Release the shared pool exactly once, then report a single outcome
//!
//! # Data Flow
//! ```text
//! launch()
//!     ├─ serve task: HttpServer::serve(listener, drain token)
//!     └─ driver task:
//!          wait (signal | Shutdown::trigger | serve task exits)
//!          → Running → Draining (drain token fires, accept loop stops)
//!          → await serve task until deadline (abort on timeout)
//!          → pool.close()
//!          → Draining → Stopped
//!          → outcome sent to Running::wait()
//! ```
//!
//! # Design Decisions
//! - Teardown lives on one linear path in the driver task, so the pool is
//!   closed once no matter how many signals arrive or which path triggered it
//! - A timed-out drain aborts the serve task, which drops the listener; the
//!   connections it was still serving are abandoned

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tokio::time::Instant;

use crate::db::ResourcePool;
use crate::error::AppError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

/// Owns everything that must be started and torn down together.
pub struct Orchestrator {
    server: HttpServer,
    listener: TcpListener,
    pool: Arc<dyn ResourcePool>,
    shutdown: Shutdown,
    drain_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        server: HttpServer,
        listener: TcpListener,
        pool: Arc<dyn ResourcePool>,
        shutdown: Shutdown,
        drain_timeout: Duration,
    ) -> Self {
        Self {
            server,
            listener,
            pool,
            shutdown,
            drain_timeout,
        }
    }

    /// Start serving and spawn the shutdown driver.
    ///
    /// `stop` is raced against [`Shutdown::trigger`]; whichever fires first
    /// begins the drain. Pass [`std::future::pending`] to rely on the handle
    /// alone.
    pub fn launch<S>(self, stop: S) -> Result<Running, AppError>
    where
        S: std::future::Future<Output = ()> + Send + 'static,
    {
        let Orchestrator {
            server,
            listener,
            pool,
            shutdown,
            drain_timeout,
        } = self;

        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::wrap_server(e, "failed to read listener address"))?;

        let serve_task = tokio::spawn(server.serve(listener, shutdown.cancelled()));

        let (outcome_tx, outcome_rx) = oneshot::channel();
        tokio::spawn(drive(serve_task, stop, pool, shutdown.clone(), drain_timeout, outcome_tx));

        Ok(Running {
            local_addr,
            shutdown,
            outcome: outcome_rx,
        })
    }
}

async fn drive<S>(
    mut serve_task: tokio::task::JoinHandle<io::Result<()>>,
    stop: S,
    pool: Arc<dyn ResourcePool>,
    shutdown: Shutdown,
    drain_timeout: Duration,
    outcome_tx: oneshot::Sender<Result<(), AppError>>,
) where
    S: std::future::Future<Output = ()> + Send,
{
    let exited_early = tokio::select! {
        _ = stop => None,
        _ = shutdown.stop_requested() => {
            tracing::info!("Stop requested");
            None
        }
        joined = &mut serve_task => Some(joined),
    };

    let deadline = Instant::now() + drain_timeout;
    shutdown.begin_drain(deadline);
    tracing::info!(timeout = ?drain_timeout, "Draining connections");

    let outcome = match exited_early {
        Some(joined) => serve_outcome(joined),
        None => match tokio::time::timeout_at(deadline, &mut serve_task).await {
            Ok(joined) => serve_outcome(joined),
            Err(elapsed) => {
                serve_task.abort();
                tracing::warn!(timeout = ?drain_timeout, "Drain deadline exceeded, aborting listener");
                Err(AppError::wrap_server(elapsed, "server shutdown failed"))
            }
        },
    };

    pool.close().await;
    shutdown.finish();

    if outcome.is_ok() {
        tracing::info!("Shutdown completed");
    }
    let _ = outcome_tx.send(outcome);
}

fn serve_outcome(joined: Result<io::Result<()>, JoinError>) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::wrap_server(e, "server failed")),
        Err(e) => Err(AppError::wrap_server(e, "server task failed")),
    }
}

/// Handle to a launched service.
#[must_use = "dropping the handle discards the shutdown outcome"]
pub struct Running {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    outcome: oneshot::Receiver<Result<(), AppError>>,
}

impl Running {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Wait for teardown to finish.
    ///
    /// `Ok(())` after a clean drain; a Server-class error if the listener
    /// failed or the drain deadline passed. Either way the pool is closed.
    pub async fn wait(self) -> Result<(), AppError> {
        match self.outcome.await {
            Ok(outcome) => outcome,
            Err(e) => Err(AppError::wrap_server(e, "shutdown driver exited without an outcome")),
        }
    }
}
