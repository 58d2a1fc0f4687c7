// Server module entry
// Accept loop, connection handling and shutdown

pub mod connection;
pub mod listener;

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::handler::Router;

pub use connection::ConnectionSettings;
pub use listener::create_reusable_listener;

/// Accept connections until `shutdown` resolves
pub async fn serve<Q, S>(
    listener: TcpListener,
    router: Arc<Router<Q>>,
    settings: ConnectionSettings,
    shutdown: S,
) where
    Q: Send + Sync + 'static,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::trace!(peer = %peer, "connection accepted");
                    connection::spawn_connection(stream, peer, Arc::clone(&router), settings);
                }
                Err(e) => tracing::error!(error = %e, "failed to accept connection"),
            },
            () = &mut shutdown => {
                tracing::info!("shutdown signal received, no longer accepting connections");
                break;
            }
        }
    }
}
