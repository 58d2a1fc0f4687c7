//! Request router and asset/view server for a queue dashboard.
//!
//! A [`Router`] sends each request to one of:
//! - the static file server (`/static/...` or the configured static route),
//! - a registered API handler (mounted under `/api`),
//! - the server-rendered entry view,
//!
//! and answers 404 otherwise.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use error::{ApiError, ConfigError, DispatchError, HandlerError};
pub use handler::{
    default_entry_route, default_error_handler, AppRoute, EntryContext, EntryRoute,
    HandlerResult, RequestContext, ResponseBody, Router, RouterBuilder, ViewTemplate,
};
