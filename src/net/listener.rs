//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve and bind the configured address
//! - Report bind failures as Server-class errors

use tokio::net::TcpListener;

use crate::config::ListenerConfig;
use crate::error::{AppError, AppResult};

/// Bind to the configured host and port.
pub async fn bind(config: &ListenerConfig) -> AppResult<TcpListener> {
    let address = config.bind_address();

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::wrap_server(e, format!("failed to bind {address}")))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| AppError::wrap_server(e, "failed to read listener address"))?;

    tracing::info!(address = %local_addr, "Listener bound");

    Ok(listener)
}
