//! API dispatch module
//!
//! Looks up the registered handler for a request, builds its
//! [`RequestContext`] and turns the handler's outcome into a response.

use crate::error::{ApiError, DispatchError, HandlerError};
use crate::http::{self, HttpResponse};
use crate::routing::{Params, RouteTable};
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::{Method, Request, StatusCode};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type ApiFuture = Pin<Box<dyn Future<Output = Result<HandlerResult, HandlerError>> + Send>>;

/// Registered API handler, shared by every pattern it is mounted on
pub type ApiHandler<Q> = Arc<dyn Fn(RequestContext<Q>) -> ApiFuture + Send + Sync>;

/// Shapes a recognized handler error into a response
pub type ErrorHandler = Arc<dyn Fn(&ApiError) -> HandlerResult + Send + Sync>;

/// Per-request input to an API handler
#[derive(Debug)]
pub struct RequestContext<Q> {
    /// Caller-supplied queue registry, passed through untouched
    pub queues: Arc<Q>,
    pub params: Params,
    /// Query parameters; the last value of a repeated name wins
    pub query: HashMap<String, String>,
    /// Parsed JSON body, `{}` when absent or malformed
    pub body: Value,
    /// Header names are lower-case
    pub headers: HashMap<String, String>,
}

impl<Q> RequestContext<Q> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Handler response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Text(String),
    Json(Value),
}

impl From<Value> for ResponseBody {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

impl From<String> for ResponseBody {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ResponseBody {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Status and body produced by a handler or the error handler
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResult {
    pub status: Option<StatusCode>,
    pub body: ResponseBody,
}

impl HandlerResult {
    /// Result with the default status
    pub fn ok(body: impl Into<ResponseBody>) -> Self {
        Self {
            status: None,
            body: body.into(),
        }
    }

    pub fn with_status(status: StatusCode, body: impl Into<ResponseBody>) -> Self {
        Self {
            status: Some(status),
            body: body.into(),
        }
    }

    pub fn no_content() -> Self {
        Self::with_status(StatusCode::NO_CONTENT, Value::Null)
    }
}

/// Error handler used when the caller does not supply one
pub fn default_error_handler(err: &ApiError) -> HandlerResult {
    let mut body = json!({
        "error": "Internal server error",
        "message": err.message,
    });
    if let Some(details) = &err.details {
        body["details"] = details.clone();
    }
    HandlerResult::with_status(
        err.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body,
    )
}

/// One API route definition: methods x patterns -> handler
pub struct AppRoute<Q> {
    pub methods: Vec<Method>,
    pub patterns: Vec<String>,
    pub handler: ApiHandler<Q>,
}

impl<Q: Send + Sync + 'static> AppRoute<Q> {
    pub fn new<F, Fut>(method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(RequestContext<Q>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResult, HandlerError>> + Send + 'static,
    {
        Self {
            methods: vec![method],
            patterns: vec![pattern.to_string()],
            handler: Arc::new(move |ctx| Box::pin(handler(ctx)) as ApiFuture),
        }
    }

    pub fn get<F, Fut>(pattern: &str, handler: F) -> Self
    where
        F: Fn(RequestContext<Q>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResult, HandlerError>> + Send + 'static,
    {
        Self::new(Method::GET, pattern, handler)
    }

    pub fn post<F, Fut>(pattern: &str, handler: F) -> Self
    where
        F: Fn(RequestContext<Q>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResult, HandlerError>> + Send + 'static,
    {
        Self::new(Method::POST, pattern, handler)
    }

    pub fn put<F, Fut>(pattern: &str, handler: F) -> Self
    where
        F: Fn(RequestContext<Q>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResult, HandlerError>> + Send + 'static,
    {
        Self::new(Method::PUT, pattern, handler)
    }

    pub fn delete<F, Fut>(pattern: &str, handler: F) -> Self
    where
        F: Fn(RequestContext<Q>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HandlerResult, HandlerError>> + Send + 'static,
    {
        Self::new(Method::DELETE, pattern, handler)
    }

    /// Also answer `method`
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Also mount on `pattern`
    #[must_use]
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(pattern.to_string());
        self
    }
}

/// Route table plus what handlers need at call time
pub struct ApiDispatcher<Q> {
    queues: Arc<Q>,
    routes: RouteTable<ApiHandler<Q>>,
    error_handler: Option<ErrorHandler>,
}

impl<Q: Send + Sync + 'static> ApiDispatcher<Q> {
    pub const fn new(
        queues: Arc<Q>,
        routes: RouteTable<ApiHandler<Q>>,
        error_handler: Option<ErrorHandler>,
    ) -> Self {
        Self {
            queues,
            routes,
            error_handler,
        }
    }

    pub const fn routes(&self) -> &RouteTable<ApiHandler<Q>> {
        &self.routes
    }

    /// `Ok(None)` when no route matches `path`
    pub async fn dispatch<B>(
        &self,
        req: Request<B>,
        path: &str,
    ) -> Result<Option<HttpResponse>, DispatchError>
    where
        B: Body + Send,
        B::Data: Send,
        B::Error: std::fmt::Display,
    {
        let method = req.method().as_str().to_ascii_lowercase();
        let Some((handler, params)) = self.routes.lookup(path, &method) else {
            return Ok(None);
        };
        tracing::debug!(method = %method, path, "dispatching API request");

        let ctx = self.build_context(req, &method, params).await;
        match handler(ctx).await {
            Ok(result) => Ok(Some(success_response(result))),
            Err(HandlerError::Api(err)) => {
                let Some(error_handler) = &self.error_handler else {
                    return Err(DispatchError::Unhandled(err));
                };
                tracing::warn!(method = %method, path, error = %err, "API handler failed");
                Ok(Some(error_response(error_handler(&err))))
            }
            Err(HandlerError::Other(err)) => Err(DispatchError::Handler(err)),
        }
    }

    async fn build_context<B>(
        &self,
        req: Request<B>,
        method: &str,
        params: Params,
    ) -> RequestContext<Q>
    where
        B: Body + Send,
        B::Data: Send,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();

        let query: HashMap<String, String> = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in &parts.headers {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|v| {
                    v.push_str(", ");
                    v.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }

        let params: Params = params
            .into_iter()
            .map(|(k, v)| (k, percent_decode_str(&v).decode_utf8_lossy().into_owned()))
            .collect();

        let body = if method == "get" || method == "head" {
            empty_object()
        } else {
            read_json_body(body).await
        };

        RequestContext {
            queues: Arc::clone(&self.queues),
            params,
            query,
            body,
            headers,
        }
    }
}

/// Parse the body as JSON; anything unreadable or malformed becomes `{}`
async fn read_json_body<B>(body: B) -> Value
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            tracing::debug!(error = %e, "failed to read request body");
            return empty_object();
        }
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|_| empty_object())
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn success_response(result: HandlerResult) -> HttpResponse {
    match result.status {
        Some(StatusCode::NO_CONTENT) => http::build_no_content_response(),
        status => http::build_json_response(status.unwrap_or(StatusCode::OK), &result.body),
    }
}

fn error_response(result: HandlerResult) -> HttpResponse {
    // 204 cannot carry the error body
    let status = match result.status {
        None | Some(StatusCode::NO_CONTENT) => StatusCode::INTERNAL_SERVER_ERROR,
        Some(status) => status,
    };
    match result.body {
        ResponseBody::Text(text) => http::build_text_response(status, text),
        ResponseBody::Json(value) => http::build_json_response(status, &value),
    }
}
