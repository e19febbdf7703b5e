// Configuration module entry point
// Loads application configuration and builds the shared request context

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::AppError;

// Re-export public types
pub use state::{AppState, Frontend};
pub use types::{
    AppConfig, Config, CorsConfig, FrontendConfig, HighlightConfig, HttpConfig, LoggingConfig,
    PerformanceConfig, RankerConfig, SearchConfig, ServerConfig,
};

/// Environment variable prefix, e.g. `SEARCH_APP__DEVELOPMENT=true`
const ENV_PREFIX: &str = "SEARCH";

/// `SEARCH_*` overrides; list keys take comma separated values
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
        .with_list_parse_key("frontend.root_files")
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, environment())
    }

    /// File first, then `env` on top
    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, AppError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| AppError::InvalidAddress { addr, source })
    }
}
