use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod app;
mod http;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "monday_gateway=info,tower_http=info".into()),
        )
        .init();

    // load config: explicit path > MONDAY_CONFIG env > ./monday.toml
    let config_path = std::env::var("MONDAY_CONFIG").ok();
    let config = match monday_core::config::MondayConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let state = match app::AppState::build(config).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to initialize gateway");
            std::process::exit(1);
        }
    };

    let addr: SocketAddr = match format!("{bind}:{port}").parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid bind address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(%addr, "monday gateway listening");

    let shutdown = CancellationToken::new();
    let scheduler_handle = {
        let scheduler = state.scheduler.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { scheduler.start_all(shutdown).await })
    };
    state.meeting_sync_orchestrator.start().await;

    let router = app::build_router(state.clone());
    let server_shutdown = shutdown.clone();
    let serve_result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await;

    // Graceful shutdown fan-out (§5): scheduler, then meeting-sync
    // orchestrator, then the durable stores close on drop below.
    state.scheduler.stop_all();
    state.meeting_sync_orchestrator.stop();
    let _ = scheduler_handle.await;

    if let Err(e) = serve_result {
        error!(error = %e, "server exited with error");
        std::process::exit(1);
    }

    info!("monday gateway shut down gracefully");
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
