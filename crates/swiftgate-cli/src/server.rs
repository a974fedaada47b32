//! Server startup and lifecycle

use crate::middleware::{spawn_limiter_cleanup, LIMITER_CLEANUP_INTERVAL};
use crate::{routes, seed, AppState, GatewayConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Build state, apply the seed file, and produce the router
pub async fn build_app(config: GatewayConfig) -> anyhow::Result<axum::Router> {
    let state = Arc::new(AppState::new(config)?);

    if let Some(path) = state.config.seed_file.as_deref() {
        let inserted = seed::seed_from_file(state.resolver(), path).await?;
        info!("Seeded {} Swift configuration(s) from {}", inserted, path.display());
    }

    spawn_limiter_cleanup(&state.rate_limit.limiter, LIMITER_CLEANUP_INTERVAL);

    Ok(routes::create_router(state))
}

/// Run the gateway server until Ctrl-C or SIGTERM
pub async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    run_server_with_shutdown(config, shutdown_signal()).await
}

/// Run server with graceful shutdown
pub async fn run_server_with_shutdown(
    config: GatewayConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let prefix = config.route_prefix();
    let app = build_app(config).await?;

    let listener = TcpListener::bind(&addr).await?;
    info!("Swiftgate listening on http://{}{}", addr, prefix);

    serve(listener, app, shutdown_signal).await
}

/// Serve an already-bound listener
pub async fn serve(
    listener: TcpListener,
    app: axum::Router,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Gateway shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
