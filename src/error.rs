//! Startup error type
//!
//! Request handling never fails (every problem becomes an HTTP status), so the
//! only fallible path is bringing the server up.

use thiserror::Error;

use crate::services::ServiceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to initialize services: {0}")]
    Service(#[from] ServiceError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
