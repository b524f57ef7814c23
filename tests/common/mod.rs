//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use mediary::config::TimeoutConfig;
use mediary::db::ResourcePool;
use mediary::error::AppError;
use mediary::http::{AppState, HttpServer, RouteRegistrar};
use mediary::lifecycle::{Orchestrator, Running, Shutdown};

/// A log event captured by [`LogCapture`].
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl RecordedEvent {
    pub fn message(&self) -> &str {
        self.field("message").unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Layer that keeps every event in memory.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.events.lock().unwrap().push(RecordedEvent {
            level: *event.metadata().level(),
            fields,
        });
    }
}

impl LogCapture {
    /// Capture events on the current thread until the guard drops.
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn with_message(&self, message: &str) -> Vec<RecordedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.message() == message)
            .collect()
    }
}

/// Pool double that counts releases.
#[derive(Default)]
pub struct CountingPool {
    closes: AtomicUsize,
}

impl CountingPool {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl ResourcePool for CountingPool {
    fn ping(&self) -> BoxFuture<'_, Result<(), AppError>> {
        async { Ok(()) }.boxed()
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        async move {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    }
}

/// Routes that panic with each kind of payload.
pub struct PanicRoutes;

impl RouteRegistrar for PanicRoutes {
    fn register(&self, router: Router<AppState>) -> Router<AppState> {
        router
            .route("/panic/str", get(panic_str))
            .route("/panic/string", get(panic_string))
            .route("/panic/app-error", get(panic_app_error))
            .route("/panic/opaque", get(panic_opaque))
    }
}

async fn panic_str() -> StatusCode {
    panic!("static message")
}

async fn panic_string() -> StatusCode {
    let user = 42;
    panic!("user {user} not loaded")
}

async fn panic_app_error() -> StatusCode {
    std::panic::panic_any(AppError::not_found("order 7"))
}

async fn panic_opaque() -> StatusCode {
    std::panic::panic_any(404_u32)
}

/// Handshake between a test and a handler it holds open.
#[derive(Clone, Default)]
pub struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Resolves once the handler has started running.
    pub async fn entered(&self) {
        self.entered.notified().await
    }

    /// Let the held handler finish.
    pub fn open(&self) {
        self.release.notify_one();
    }
}

/// `GET /gated` signals entry, then answers "done" once the gate opens.
pub struct GatedRoute(pub Gate);

impl RouteRegistrar for GatedRoute {
    fn register(&self, router: Router<AppState>) -> Router<AppState> {
        let gate = self.0.clone();
        router.route(
            "/gated",
            get(move || {
                let gate = gate.clone();
                async move {
                    gate.entered.notify_one();
                    gate.release.notified().await;
                    "done"
                }
            }),
        )
    }
}

pub fn state(pool: Arc<CountingPool>, shutdown: Shutdown) -> AppState {
    AppState { pool, shutdown }
}

/// Router with the full interceptor chain, for `oneshot` tests.
pub fn router(registrars: &[Box<dyn RouteRegistrar>]) -> Router {
    let state = state(Arc::new(CountingPool::default()), Shutdown::new());
    HttpServer::new(state, registrars, &TimeoutConfig::default()).router()
}

/// Launch the whole service on an ephemeral loopback port.
pub async fn launch(
    pool: Arc<CountingPool>,
    registrars: &[Box<dyn RouteRegistrar>],
    drain_timeout: Duration,
) -> Running {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(
        state(Arc::clone(&pool), shutdown.clone()),
        registrars,
        &TimeoutConfig::default(),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

    Orchestrator::new(server, listener, pool, shutdown, drain_timeout)
        .launch(std::future::pending())
        .unwrap()
}
