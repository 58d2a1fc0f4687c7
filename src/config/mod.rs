// Configuration module entry point
// Loads the server configuration and applies the dashboard section to a router

mod types;

use serde_json::Value;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::handler::view::entry_route;
use crate::handler::RouterBuilder;

// Re-export public types
pub use types::{Config, DashboardConfig, LoggingConfig, ServerConfig};

/// Prefix for environment overrides, e.g. `BOARD__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "BOARD";

impl Config {
    /// Load configuration from specified file path, with or without extension
    /// Missing files are allowed; defaults and environment fill the rest
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.max_body_size", 1_048_576)? // 1MB
            .set_default("server.keep_alive", true)?
            .set_default("server.request_timeout", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("dashboard.base_path", "/")?
            .set_default("dashboard.static_route", "/static")?
            .set_default("dashboard.static_dir", "static")?
            .set_default("dashboard.views_dir", "views")?
            .set_default("dashboard.entry_paths", vec!["/"])?
            .set_default("dashboard.template", "index.ejs")?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        // The config crate lowercases keys; the UI table is handed to the client verbatim
        if let Some(ui_config) = read_ui_config(config_path)? {
            cfg.dashboard.ui_config = ui_config;
        }
        Ok(cfg)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                ConfigError::Address(format!("{}:{} ({e})", self.server.host, self.server.port))
            })
    }
}

/// `[dashboard.ui_config]` from the TOML config file with key case preserved
///
/// `None` when the file or the table is absent.
fn read_ui_config(config_path: &str) -> Result<Option<Value>, ConfigError> {
    let mut path = PathBuf::from(config_path);
    match path.extension().and_then(|e| e.to_str()) {
        None => {
            path.set_extension("toml");
        }
        Some("toml") => {}
        // Other formats go through the config crate only
        Some(_) => return Ok(None),
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    let doc: toml::Table =
        toml::from_str(&content).map_err(|e| ConfigError::UiConfig(e.to_string()))?;
    doc.get("dashboard")
        .and_then(|d| d.get("ui_config"))
        .map(|table| {
            serde_json::to_value(table).map_err(|e| ConfigError::UiConfig(e.to_string()))
        })
        .transpose()
}

impl DashboardConfig {
    /// Apply the mount settings to a router builder
    pub fn apply<Q: Send + Sync + 'static>(&self, builder: RouterBuilder<Q>) -> RouterBuilder<Q> {
        builder
            .set_base_path(&self.base_path)
            .set_static_path(&self.static_route, &self.static_dir)
            .contain_static_paths(self.contain_static_paths)
            .set_views_path(&self.views_dir)
            .set_ui_config(self.ui_config.clone())
            .set_entry_route(entry_route(self.entry_paths.clone(), &self.template))
    }
}
