//! Folio server entry point.
//!
//! Startup sequence:
//!   1. Load config (`.env` under the process environment), fail fast on errors
//!   2. Init logger at the configured level (`RUST_LOG` wins when set)
//!   3. Resolve the template source
//!   4. Spawn the Ctrl-C / SIGTERM → shutdown watcher
//!   5. Serve until shutdown, then drain

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use folio_server::{config, error::AppError, logger, server::WebServer};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Arc::new(config::load()?);

    logger::init(&config)?;

    info!(
        app_name = %config.app_name,
        app_version = %config.app_version,
        environment = %config.environment,
        framework = %config.framework,
        debug = config.debug,
        bind_addr = %config.bind_addr(),
        "config loaded"
    );

    let server = WebServer::new(Arc::clone(&config))?;

    // Signals cancel this token; the server watches it.
    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    server.run(shutdown).await
}

async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl-c received, shutting down"),
        _ = terminate => info!("sigterm received, shutting down"),
    }
    shutdown.cancel();
}
