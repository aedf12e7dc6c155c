//! tunefind-proxy - credential-hiding proxy for the Tunefind web client
//!
//! Forwards catalog, lyrics, news and LLM requests to their upstream APIs so
//! the browser never sees an API credential.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tunefind_common::config::{CliOverrides, ConfigResolver, Secrets};
use tunefind_proxy::{build_router, AppState};

/// Command-line arguments for tunefind-proxy
#[derive(Parser, Debug)]
#[command(name = "tunefind-proxy")]
#[command(about = "Upstream API proxy for the Tunefind web client")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/tunefind/config.toml)
    #[arg(short, long, env = "TUNEFIND_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    let dotenv = dotenvy::dotenv().ok();

    let args = Args::parse();
    let cli = CliOverrides {
        config_path: args.config,
        bind: args.bind,
        port: args.port,
    };

    let config = tunefind_common::logging::with_bootstrap_logging(|| {
        ConfigResolver::new("tunefind-proxy").resolve(&cli)
    })
    .context("Failed to resolve configuration")?;

    tunefind_common::logging::init_tracing(&config.log_level)?;

    info!(
        "Starting Tunefind proxy (tunefind-proxy) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        tunefind_proxy::BUILD_INFO.git_hash,
        tunefind_proxy::BUILD_INFO.built_at,
        tunefind_proxy::BUILD_INFO.profile
    );
    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    // Client id/secret are required for every catalog route
    let secrets = Secrets::from_env().context("Catalog client credentials are missing")?;

    info!(
        catalog = %config.upstream.catalog_base_url,
        timeout_secs = config.upstream_timeout.as_secs(),
        allowed_prefixes = config.proxy_allowed_prefixes.len(),
        "Upstream configuration"
    );

    let state = AppState::new(&config, secrets).context("Failed to build upstream clients")?;
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
