//! Routing module
//!
//! Provides the API route lookup:
//! - Pattern matching with `:name` parameters
//! - Ordered, method-keyed route table (first match wins)

mod matcher;
mod table;

pub use matcher::{match_pattern, Params};
pub use table::RouteTable;
