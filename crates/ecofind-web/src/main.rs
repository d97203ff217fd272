//! Admin console server for the `EcoFind` marketplace
#![forbid(unsafe_code)]

use clap::Parser;
use ecofind_core::{context_error, context_error::Result, init_logging, Config};
use ecofind_web::{build_app_with_state, spawn_chat_sweeper, AppState};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Command-line options
#[derive(Debug, Parser)]
#[command(name = "ecofind-console", version, about = "EcoFind admin console server")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    if let Err(e) = dotenv {
        info!("No .env file loaded: {e}");
    }

    info!("╔══════════════════════════════════════════════════════════╗");
    info!(
        "║          EcoFind Admin Console v{}                    ║",
        env!("CARGO_PKG_VERSION")
    );
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("🔗 Backend: {}", config.backend_url());
    info!("💬 Chat leads: {}", config.lead_url());

    let state = Arc::new(AppState::new(config.clone())?);
    if state.current_session().is_none() {
        info!("🔐 No stored session, waiting for admin login");
    }
    let sweeper = spawn_chat_sweeper(Arc::clone(&state));
    let app = build_app_with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| context_error!("Invalid server address: {}", e))?;
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| context_error!("Failed to bind to {}: {}", addr, e))?;

    info!("🚀 Console listening on http://{addr}");
    info!("💚 Health: http://{addr}/health");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| context_error!("Server error: {}", e))?;

    sweeper.abort();
    info!("👋 Server shutdown complete");
    Ok(())
}

/// Resolve once Ctrl+C or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
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
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received terminate signal, shutting down gracefully..."),
    }
}
