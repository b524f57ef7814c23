//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with built-in and registered routes
//! - Wire up the interceptor chain (real ip, trace, request log, recovery, timeout)
//! - Serve on a listener until the drain signal fires

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::config::TimeoutConfig;
use crate::db::ResourcePool;
use crate::http::handlers::{health, simulate_panic};
use crate::http::middleware::{log_requests, propagate_trace, recover_panics, resolve_real_ip};
use crate::lifecycle::Shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared pool. Handlers use it; only the orchestrator closes it.
    pub pool: Arc<dyn ResourcePool>,
    pub shutdown: Shutdown,
}

/// A group of business routes.
pub trait RouteRegistrar: Send + Sync {
    fn register(&self, router: Router<AppState>) -> Router<AppState>;
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build the router from the registrars plus the built-in routes.
    pub fn new(
        state: AppState,
        registrars: &[Box<dyn RouteRegistrar>],
        timeouts: &TimeoutConfig,
    ) -> Self {
        let router = Self::build_router(state, registrars, timeouts);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers added last run first: real ip → trace → request log →
    /// recovery → timeout → handler.
    #[allow(deprecated)]
    fn build_router(
        state: AppState,
        registrars: &[Box<dyn RouteRegistrar>],
        timeouts: &TimeoutConfig,
    ) -> Router {
        let mut routes = Router::new()
            .route("/health", get(health))
            .route("/panic", get(simulate_panic));

        for registrar in registrars {
            routes = registrar.register(routes);
        }

        routes
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)))
            .layer(middleware::from_fn(recover_panics))
            .layer(middleware::from_fn(log_requests))
            .layer(middleware::from_fn(propagate_trace))
            .layer(middleware::from_fn(resolve_real_ip))
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `drain` resolves, then finish in-flight requests.
    ///
    /// Once `drain` fires the accept loop stops and the listener is dropped;
    /// open connections get keep-alive disabled and close after their
    /// current response.
    pub async fn serve<F>(self, listener: TcpListener, drain: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Listening and serving");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(drain)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
