//! viewmeter server
//!
//! - `/view/` counts views and clicks per category
//! - `/stats/` is capped by the admission gate
//! - counters drain to the store log every few seconds

use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use viewmeter_core::error::{MeterError, Result};
use viewmeter_server::{app_state::AppState, config, server};

const DEFAULT_CONFIG_PATH: &str = "viewmeter.yaml";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.client_code().as_str(), "viewmeter-server exited");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = env::var("VIEWMETER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_or_default(&path)?;
    let listen = cfg.server.listen_addr()?;

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MeterError::Internal(format!("bind {listen} failed: {e}")))?;

    server::serve(AppState::new(cfg), listener, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
