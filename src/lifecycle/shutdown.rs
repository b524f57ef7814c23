//! Shutdown coordination for the service.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Process-wide shutdown state. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShutdownState {
    /// Serving normally.
    Running,
    /// No new connections; in-flight requests finishing.
    Draining,
    /// Resources released.
    Stopped,
}

impl fmt::Display for ShutdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownState::Running => write!(f, "running"),
            ShutdownState::Draining => write!(f, "draining"),
            ShutdownState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Coordinator for graceful shutdown.
///
/// Cheap to clone. Handlers may hold one to observe the drain; only the
/// lifecycle orchestrator advances the state.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

struct Inner {
    /// External stop requests.
    stop: CancellationToken,
    /// Fired when draining begins.
    drain: CancellationToken,
    state: watch::Sender<ShutdownState>,
    deadline: OnceLock<Instant>,
}

impl Shutdown {
    /// Create a new shutdown coordinator in the `Running` state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self {
            inner: Arc::new(Inner {
                stop: CancellationToken::new(),
                drain: CancellationToken::new(),
                state,
                deadline: OnceLock::new(),
            }),
        }
    }

    /// Request a stop. Repeated calls are no-ops.
    pub fn trigger(&self) {
        self.inner.stop.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.stop.is_cancelled()
    }

    /// Resolves once [`trigger`](Self::trigger) has been called.
    pub async fn stop_requested(&self) {
        self.inner.stop.cancelled().await
    }

    /// Resolves once draining begins.
    pub fn cancelled(&self) -> WaitForCancellationFutureOwned {
        self.inner.drain.clone().cancelled_owned()
    }

    pub fn is_draining(&self) -> bool {
        self.inner.drain.is_cancelled()
    }

    pub fn state(&self) -> ShutdownState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.inner.state.subscribe()
    }

    /// The instant by which the drain must finish, once draining.
    pub fn drain_deadline(&self) -> Option<Instant> {
        self.inner.deadline.get().copied()
    }

    /// Running → Draining. Returns `false` if already past `Running`.
    pub(crate) fn begin_drain(&self, deadline: Instant) -> bool {
        if !self.advance(ShutdownState::Draining) {
            return false;
        }
        let _ = self.inner.deadline.set(deadline);
        self.inner.drain.cancel();
        true
    }

    /// Draining → Stopped.
    pub(crate) fn finish(&self) -> bool {
        self.advance(ShutdownState::Stopped)
    }

    fn advance(&self, next: ShutdownState) -> bool {
        let advanced = self.inner.state.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });
        if advanced {
            tracing::info!(state = %next, "Shutdown state changed");
        }
        advanced
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shutdown")
            .field("state", &self.state())
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
