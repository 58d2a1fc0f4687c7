//! Request handler module
//!
//! Responsible for request routing dispatch: static assets, API handlers and
//! the server-rendered entry view.

pub mod api;
pub mod router;
pub mod static_files;
pub mod template;
pub mod view;

// Re-export main entry points
pub use api::{
    default_error_handler, ApiHandler, AppRoute, ErrorHandler, HandlerResult, RequestContext,
    ResponseBody,
};
pub use router::{Router, RouterBuilder};
pub use view::{default_entry_route, EntryContext, EntryRoute, ViewTemplate};
