// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
///
/// Every section falls back to its `Default` impl, so an empty file (or no
/// file at all) yields a runnable production configuration.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub cors: CorsConfig,
    pub frontend: FrontendConfig,
    pub search: SearchConfig,
    pub ranker: RankerConfig,
    pub highlight: HighlightConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

/// Feature switches deciding which services are wired and how the
/// frontend is exposed
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Skip constructing every collaborator service
    pub testing: bool,
    /// Attach snippets to search results
    pub highlight: bool,
    /// Rerank search candidates with the model ranker
    pub neural_ranking: bool,
    /// Local frontend development: CORS on, no bundled frontend
    pub development: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            testing: false,
            highlight: true,
            neural_ranking: false,
            development: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: "combined".to_string(),
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds in-flight connections get to finish after a shutdown signal
    pub shutdown_grace: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
            shutdown_grace: 10,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: "search-server".to_string(),
            max_body_size: 1_048_576, // 1MB
        }
    }
}

/// Origins allowed to call the API while `app.development` is on
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub max_age: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost".to_string(),
            ],
            allow_credentials: true,
            max_age: 600,
        }
    }
}

/// Pre-built frontend bundle served outside development mode
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FrontendConfig {
    /// Directory holding the bundle (index.html, manifest.json, ...)
    pub dir: String,
    /// Document returned for every unmatched non-API path
    pub index_file: String,
    /// URL prefix mounted onto `dir`
    pub mount: String,
    /// Files served by exact path from the bundle root
    pub root_files: Vec<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            dir: "static".to_string(),
            index_file: "index.html".to_string(),
            mount: "/static".to_string(),
            root_files: vec![
                "/manifest.json".to_string(),
                "/favicon.ico".to_string(),
                "/logo192.png".to_string(),
                "/logo512.png".to_string(),
            ],
        }
    }
}

/// Search router and corpus searcher settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// JSON array of documents loaded by the corpus searcher
    pub corpus_path: String,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Number of top candidates handed to the ranker
    pub rerank_window: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            corpus_path: "data/corpus.json".to_string(),
            default_limit: 10,
            max_limit: 100,
            rerank_window: 50,
        }
    }
}

/// Model-serving endpoint used by the ranker
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RankerConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9000/rerank".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// Snippet extraction settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HighlightConfig {
    pub snippet_chars: usize,
    pub pre_tag: String,
    pub post_tag: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            snippet_chars: 200,
            pre_tag: "<mark>".to_string(),
            post_tag: "</mark>".to_string(),
        }
    }
}
