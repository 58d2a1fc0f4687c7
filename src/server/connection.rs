// Connection module
// Serves one accepted TCP connection with the dashboard router

use hyper::body::Incoming;
use hyper::header::CONTENT_LENGTH;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

use crate::config::ServerConfig;
use crate::error::DispatchError;
use crate::handler::Router;
use crate::http::{self, HttpResponse};
use crate::logger;

/// Settings applied to every connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub keep_alive: bool,
    pub timeout: Duration,
    pub max_body_size: u64,
    pub access_log: bool,
}

impl ConnectionSettings {
    pub const fn new(server: &ServerConfig, access_log: bool) -> Self {
        Self {
            keep_alive: server.keep_alive,
            timeout: Duration::from_secs(server.request_timeout),
            max_body_size: server.max_body_size,
            access_log,
        }
    }
}

/// Spawn a task serving `stream` until the client closes or the timeout hits
pub fn spawn_connection<Q: Send + Sync + 'static>(
    stream: TcpStream,
    peer: SocketAddr,
    router: Arc<Router<Q>>,
    settings: ConnectionSettings,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let service = service_fn(move |req| {
            let router = Arc::clone(&router);
            async move { handle(req, &router, settings).await }
        });

        let mut builder = http1::Builder::new();
        builder.keep_alive(settings.keep_alive);
        let conn = builder.serve_connection(io, service);

        match tokio::time::timeout(settings.timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&peer, &err),
            Err(_) => tracing::debug!(
                peer = %peer,
                timeout_secs = settings.timeout.as_secs(),
                "connection timed out"
            ),
        }
    });
}

async fn handle<Q: Send + Sync + 'static>(
    req: Request<Incoming>,
    router: &Router<Q>,
    settings: ConnectionSettings,
) -> Result<HttpResponse, DispatchError> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let result = match check_body_size(&req, settings.max_body_size) {
        Some(resp) => Ok(resp),
        None => router.handle(req).await,
    };

    match &result {
        Ok(resp) if settings.access_log => {
            logger::log_access(&method, &path, resp.status(), started.elapsed());
        }
        Ok(_) => {}
        Err(e) => tracing::error!(method = %method, path = %path, error = %e, "request failed"),
    }
    result
}

/// Reject declared bodies above `max_body_size` with 413
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<HttpResponse> {
    let value = req.headers().get(CONTENT_LENGTH)?;
    let Ok(size) = value.to_str().unwrap_or_default().parse::<u64>() else {
        tracing::warn!(value = ?value, "invalid Content-Length, skipping size check");
        return None;
    };

    if size > max_body_size {
        tracing::warn!(size, max_body_size, "request body too large");
        return Some(http::build_413_response());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    fn with_length(len: &str) -> Request<()> {
        Request::builder()
            .header(CONTENT_LENGTH, len)
            .body(())
            .unwrap()
    }

    #[test]
    fn test_body_size_limit() {
        assert!(check_body_size(&with_length("10"), 10).is_none());
        let resp = check_body_size(&with_length("11"), 10).unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_missing_or_invalid_length_passes() {
        let req = Request::builder().body(()).unwrap();
        assert!(check_body_size(&req, 10).is_none());
        assert!(check_body_size(&with_length("lots"), 10).is_none());
    }
}
