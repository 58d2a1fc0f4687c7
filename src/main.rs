use std::sync::Arc;

use board_router::config::Config;
use board_router::error::BoxError;
use board_router::server::{self, ConnectionSettings};
use board_router::{default_error_handler, logger, Router};

mod demo;

fn main() -> Result<(), BoxError> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!(workers, "using configured worker threads");
    } else {
        tracing::info!("using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), BoxError> {
    let addr = cfg.socket_addr()?;

    let router = cfg
        .dashboard
        .apply(Router::<demo::Queues>::builder())
        .set_queues(demo::Queues::sample())
        .set_error_handler(default_error_handler)
        .set_api_routes(demo::routes())?
        .build()?;

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let settings = ConnectionSettings::new(&cfg.server, cfg.logging.access_log);
    server::serve(listener, Arc::new(router), settings, shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
