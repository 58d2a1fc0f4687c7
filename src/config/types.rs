// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use serde_json::{Map, Value};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub dashboard: DashboardConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Largest accepted `Content-Length`, in bytes
    pub max_body_size: u64,
    pub keep_alive: bool,
    /// Per-connection timeout in seconds
    pub request_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub access_log: bool,
}

/// Dashboard mount configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub base_path: String,
    pub static_route: String,
    pub static_dir: String,
    pub views_dir: String,
    pub entry_paths: Vec<String>,
    pub template: String,
    #[serde(default)]
    pub contain_static_paths: bool,
    /// Free-form table handed to the entry view as `uiConfig`
    #[serde(default = "empty_object")]
    pub ui_config: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
