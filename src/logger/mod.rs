//! Logger module
//!
//! Thin facade over `tracing`:
//! - lifecycle and connection messages
//! - access lines in several formats on the `access` target
//! - errors and warnings
//!
//! `init` installs a global fmt subscriber; before that (and in tests) the
//! macros are no-ops, so every function here is safe to call at any time.

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::AppError;

/// Target used for access lines, filterable via `RUST_LOG=access=off`
pub const ACCESS_TARGET: &str = "access";

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once
/// at application startup.
pub fn init(config: &Config) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.logging.level)
            .map_err(|e| AppError::Logging(format!("invalid level '{}': {e}", config.logging.level)))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

pub fn write_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!(
        "Mode: {}{}",
        if config.app.development {
            "development (CORS enabled, no frontend)"
        } else {
            "production (serving frontend)"
        },
        if config.app.testing { ", testing" } else { "" }
    ));
    write_info(&format!(
        "Services: highlight={}, neural_ranking={}",
        config.app.highlight, config.app.neural_ranking
    ));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        write_info(&format!("Max connections: {max}"));
    }
}

pub fn log_shutdown_started(active: usize) {
    write_info(&format!(
        "[Shutdown] Signal received, draining {active} connection(s)"
    ));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections closed");
    } else {
        log_warning(&format!(
            "[Shutdown] Grace period elapsed with {remaining} connection(s) open"
        ));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_request(method: &str, path: &str, status: u16) {
    tracing::debug!("{method} {path} - {status}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
