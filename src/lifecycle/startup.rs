//! Startup orchestration.
//!
//! # Responsibilities
//! - Parse the command line
//! - Load the dotenv file, then logging, then configuration
//! - Open the database pool and apply migrations
//! - Build the router, bind the listener and hand off to the orchestrator
//! - Map the final outcome to a process exit status
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)
//! - A pool opened before a later startup failure is closed before returning

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::config::{load_config, load_env_file};
use crate::db::{run_migrations, Database, ResourcePool};
use crate::error::{AppError, AppResult};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::orchestrator::Orchestrator;
use crate::lifecycle::signals::{wait_for_termination, Signals};
use crate::lifecycle::Shutdown;
use crate::net;
use crate::observability::logging::{self, LoggingConfig};
use crate::resilience::fault_boundary;

#[derive(Debug, Parser)]
#[command(name = "mediary")]
#[command(about = "HTTP service with traced, panic-safe request handling", long_about = None)]
pub struct Cli {
    /// Dotenv file loaded before configuration
    #[arg(long, value_name = "FILE")]
    pub env: Option<PathBuf>,

    /// Optional TOML base configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Run the service to completion.
pub async fn run(cli: Cli) -> ExitCode {
    let env_loaded = load_env_file(cli.env.as_deref());
    let guard = logging::init(&LoggingConfig::from_env());
    if !env_loaded {
        tracing::info!("No .env file found, continuing with OS environment variables");
    }
    fault_boundary::install_panic_hook();

    let status = exit_status(start(&cli).await);
    guard.flush();
    ExitCode::from(status)
}

/// Log a failed run and map the outcome to the process exit status:
/// 0 after a clean shutdown, 1 for any classified error.
pub fn exit_status(outcome: AppResult<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(err) => {
            err.log("application error");
            1
        }
    }
}

async fn start(cli: &Cli) -> AppResult<()> {
    let config = load_config(cli.config.as_deref())
        .map_err(|e| AppError::wrap_config(e, "failed to load config"))?;

    tracing::info!(
        app_env = %config.app_env,
        production = config.is_production(),
        bind_address = %config.listener.bind_address(),
        request_timeout_secs = config.timeouts.request_secs,
        drain_secs = config.timeouts.drain_secs,
        "Configuration loaded"
    );

    let signals = Signals::install()?;

    let database = Database::open(&config.database).await?;
    if let Err(err) = run_migrations(&database, Path::new(&config.database.migrations_path)).await {
        database.close().await;
        return Err(err);
    }
    let pool: Arc<dyn ResourcePool> = Arc::new(database);

    let shutdown = Shutdown::new();
    let state = AppState {
        pool: Arc::clone(&pool),
        shutdown: shutdown.clone(),
    };
    let server = HttpServer::new(state, &[], &config.timeouts);

    let listener = match net::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(err) => {
            pool.close().await;
            return Err(err);
        }
    };

    let running = Orchestrator::new(
        server,
        listener,
        pool,
        shutdown,
        Duration::from_secs(config.timeouts.drain_secs),
    )
    .launch(wait_for_termination(signals))?;

    tracing::info!(address = %running.local_addr(), "Service started");
    running.wait().await
}
