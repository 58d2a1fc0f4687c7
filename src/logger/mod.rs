//! Logger module
//!
//! Installs the `tracing` subscriber and provides the server lifecycle and
//! access log events.

use crate::config::{Config, LoggingConfig};
use crate::error::BoxError;
use hyper::{Method, StatusCode};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        listen = %addr,
        base_path = %config.dashboard.base_path,
        static_dir = %config.dashboard.static_dir,
        views_dir = %config.dashboard.views_dir,
        workers = ?config.server.workers,
        max_body_size = config.server.max_body_size,
        "dashboard server started"
    );
}

/// One line per completed request
pub fn log_access(method: &Method, path: &str, status: StatusCode, elapsed: Duration) {
    tracing::info!(
        target: "board_router::access",
        method = %method,
        path,
        status = status.as_u16(),
        elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        "request"
    );
}

pub fn log_connection_error(peer: &SocketAddr, err: &impl std::fmt::Display) {
    tracing::warn!(peer = %peer, error = %err, "failed to serve connection");
}
