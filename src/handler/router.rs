//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Each request goes, in order, to
//! the static server, the API dispatcher, the entry view, and finally 404.

use super::api::{AppRoute, ApiDispatcher, ApiHandler, ErrorHandler, HandlerResult};
use super::static_files::{normalize_prefix, StaticFiles, STATIC_PREFIX};
use super::view::{EntryRoute, ViewRenderer};
use crate::error::{ApiError, ConfigError, DispatchError};
use crate::http::{self, HttpResponse};
use crate::routing::RouteTable;
use hyper::body::Body;
use hyper::Request;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Mount point of the API routes below the base path
pub const API_PREFIX: &str = "/api";

/// Builder collecting the router's setup
///
/// `Q` is the queue registry handed to every API handler.
pub struct RouterBuilder<Q> {
    base_path: String,
    static_path: Option<(String, PathBuf)>,
    contain_static: bool,
    views_path: Option<PathBuf>,
    ui_config: Option<Value>,
    error_handler: Option<ErrorHandler>,
    routes: RouteTable<ApiHandler<Q>>,
    queues: Option<Arc<Q>>,
    entry_route: Option<EntryRoute>,
}

impl<Q: Send + Sync + 'static> Default for RouterBuilder<Q> {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            static_path: None,
            contain_static: false,
            views_path: None,
            ui_config: None,
            error_handler: None,
            routes: RouteTable::new(),
            queues: None,
            entry_route: None,
        }
    }
}

impl<Q: Send + Sync + 'static> RouterBuilder<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount point of the whole dashboard, `/` by default
    #[must_use]
    pub fn set_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_prefix(base_path);
        self
    }

    /// Serve `dir` under the URL prefix `route`
    #[must_use]
    pub fn set_static_path(mut self, route: &str, dir: impl Into<PathBuf>) -> Self {
        self.static_path = Some((route.to_string(), dir.into()));
        self
    }

    /// Reject static paths that resolve outside the static directory
    #[must_use]
    pub const fn contain_static_paths(mut self, contain: bool) -> Self {
        self.contain_static = contain;
        self
    }

    #[must_use]
    pub fn set_views_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.views_path = Some(dir.into());
        self
    }

    #[must_use]
    pub fn set_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ApiError) -> HandlerResult + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn set_queues(mut self, queues: impl Into<Arc<Q>>) -> Self {
        self.queues = Some(queues.into());
        self
    }

    /// Opaque UI configuration forwarded to the entry handler
    #[must_use]
    pub fn set_ui_config(mut self, ui_config: Value) -> Self {
        self.ui_config = Some(ui_config);
        self
    }

    #[must_use]
    pub fn set_entry_route(mut self, entry_route: EntryRoute) -> Self {
        self.entry_route = Some(entry_route);
        self
    }

    /// Register API routes; the queue registry must already be set
    pub fn set_api_routes<I>(mut self, routes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = AppRoute<Q>>,
    {
        if self.queues.is_none() {
            return Err(ConfigError::MissingQueues);
        }

        for route in routes {
            if route.methods.is_empty() {
                return Err(ConfigError::RouteWithoutMethod(route.patterns.join(", ")));
            }
            for pattern in &route.patterns {
                for method in &route.methods {
                    self.routes
                        .register(pattern, method.as_str(), Arc::clone(&route.handler));
                }
            }
        }
        Ok(self)
    }

    /// Validate the setup and produce the router
    pub fn build(self) -> Result<Router<Q>, ConfigError> {
        let (static_route, static_dir) = self.static_path.ok_or(ConfigError::MissingStaticPath)?;
        let entry_route = self.entry_route.ok_or(ConfigError::MissingEntryRoute)?;
        let views_path = self.views_path.ok_or(ConfigError::MissingViewsPath)?;
        let ui_config = self.ui_config.ok_or(ConfigError::MissingUiConfig)?;

        let api = self
            .queues
            .map(|queues| ApiDispatcher::new(queues, self.routes, self.error_handler));

        tracing::debug!(
            base_path = %self.base_path,
            static_route = %static_route,
            entry_paths = ?entry_route.paths,
            "router configured"
        );

        Ok(Router {
            base_path: self.base_path,
            static_files: StaticFiles::new(&static_route, static_dir)
                .contained(self.contain_static),
            views: ViewRenderer::new(views_path, entry_route),
            ui_config,
            api,
        })
    }
}

/// Configured router; read-only and shareable across requests
pub struct Router<Q> {
    base_path: String,
    static_files: StaticFiles,
    views: ViewRenderer,
    ui_config: Value,
    api: Option<ApiDispatcher<Q>>,
}

impl<Q: Send + Sync + 'static> Router<Q> {
    pub fn builder() -> RouterBuilder<Q> {
        RouterBuilder::new()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Handle one request
    ///
    /// Errors are API handler failures that were not recovered into a response.
    pub async fn handle<B>(&self, req: Request<B>) -> Result<HttpResponse, DispatchError>
    where
        B: Body + Send,
        B::Data: Send,
        B::Error: std::fmt::Display,
    {
        let raw_path = req.uri().path().to_string();

        if raw_path.starts_with(STATIC_PREFIX) {
            return Ok(self.static_files.serve(&raw_path, &self.base_path).await);
        }

        let path = self.strip_base_path(&raw_path);

        if path.starts_with(self.static_files.route()) {
            return Ok(self.static_files.serve(&path, &self.base_path).await);
        }

        if let (Some(api), Some(api_path)) = (&self.api, strip_api_prefix(&path)) {
            if let Some(resp) = api.dispatch(req, api_path).await? {
                return Ok(resp);
            }
        }

        if self.views.entry().matches(&path) {
            return Ok(self.render_view().await);
        }

        // Client-side routed pages under the dashboard
        if raw_path.starts_with(&self.base_path) && !path.starts_with(API_PREFIX) {
            return Ok(self.render_view().await);
        }

        tracing::debug!(path = %raw_path, "no route matched");
        Ok(http::build_404_response())
    }

    async fn render_view(&self) -> HttpResponse {
        self.views.render(&self.base_path, &self.ui_config).await
    }

    /// Request path relative to the base path, always starting with `/`
    fn strip_base_path(&self, raw_path: &str) -> String {
        if self.base_path == "/" {
            return raw_path.to_string();
        }
        match raw_path.strip_prefix(&self.base_path) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            Some(rest) => format!("/{rest}"),
            None => raw_path.to_string(),
        }
    }
}

/// Path below the API mount, `None` outside of it
fn strip_api_prefix(path: &str) -> Option<&str> {
    match path.strip_prefix(API_PREFIX)? {
        "" => Some("/"),
        rest if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}
