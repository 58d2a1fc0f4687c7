//! Error types
//!
//! Setup-time configuration errors, the errors an API handler may fail with,
//! and the error that escapes the router when a handler failure is not recovered.

use hyper::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Boxed error used for failures the router does not know how to shape.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Missing or invalid setup, raised before any request is served.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("static route and static directory must be set")]
    MissingStaticPath,

    #[error("views directory must be set")]
    MissingViewsPath,

    #[error("UI configuration must be set")]
    MissingUiConfig,

    #[error("entry route must be set")]
    MissingEntryRoute,

    #[error("queue registry must be set before registering API routes")]
    MissingQueues,

    #[error("route {0:?} has no HTTP method")]
    RouteWithoutMethod(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse ui_config: {0}")]
    UiConfig(String),

    #[error("invalid listen address: {0}")]
    Address(String),
}

/// An error an API handler raises deliberately.
///
/// This is the only error kind the configured error handler receives.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<StatusCode>,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Failure returned by an API handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Recognized error, shaped into a response by the error handler.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Anything else; never recovered by the router.
    #[error(transparent)]
    Other(BoxError),
}

impl HandlerError {
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }
}

/// A handler failure that escaped the router.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unhandled API error: {0}")]
    Unhandled(#[source] ApiError),

    #[error("API handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl From<HandlerError> for DispatchError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Api(e) => Self::Unhandled(e),
            HandlerError::Other(e) => Self::Handler(e),
        }
    }
}

/// Template parse or render failure.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unterminated tag starting at byte {0}")]
    Unterminated(usize),

    #[error("empty expression at byte {0}")]
    EmptyExpression(usize),

    #[error("{0} is not defined")]
    Undefined(String),
}
