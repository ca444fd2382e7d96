use super::{
    middleware::{create_middleware_stack, create_trace_layer, request_logger},
    routes::create_router,
    AppState,
};
use crate::commands::cli::ServeArgs;
use axum::middleware;
use conductor_core::api::{AppConfig, CliError, Orchestrator};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

/// CLI flags win over the config file.
pub fn resolve_bind(args: &ServeArgs, cfg: &AppConfig) -> (String, u16) {
    let host = args
        .host
        .clone()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| cfg.server.host.clone());
    let port = args.port.unwrap_or(cfg.server.port);
    (host, port)
}

pub async fn handle_serve(
    args: ServeArgs,
    cfg: AppConfig,
    orchestrator: Orchestrator,
) -> Result<(), CliError> {
    let (host, port) = resolve_bind(&args, &cfg);

    if orchestrator.runner().health_check().await {
        info!(target: "conductor.http", "windmill connection established");
    } else {
        warn!(target: "conductor.http", "windmill not reachable, scripted steps will fail");
    }

    let state = AppState::new(orchestrator, cfg);
    start_server(&host, port, state).await
}

pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<(), CliError> {
    let app = create_router(state.clone())
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack(&state.config.server))
        .layer(create_trace_layer());

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| CliError::Server(format!("invalid bind address {host}:{port}: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(target: "conductor.http", "listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(target: "conductor.http", "server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = signal::ctrl_c() => info!("received Ctrl+C"),
        _ = wait_for_sigterm() => info!("received SIGTERM"),
    }
    info!("starting graceful shutdown");
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
