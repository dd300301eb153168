//! worship-api - REST service for a worship group's members, songs and scales
//!
//! Data lives in memory for the life of the process and is reseeded on
//! every start.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use worship_api::api::rate_limit::RateLimiter;
use worship_api::{build_router, AppState, AuthSettings};
use worship_common::api::generate_secret;
use worship_common::config::ServiceConfig;
use worship_common::db::seed_store;
use worship_common::{time, Store};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "worship-api")]
#[command(about = "REST API for worship group members, songs and scales")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "WORSHIP_HOST")]
    host: Option<String>,

    /// HTTP port
    #[arg(short, long, env = "WORSHIP_PORT")]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Token signing secret; a random one is generated when unset
    #[arg(long, env = "WORSHIP_TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,
}

impl Args {
    fn apply(self, config: &mut ServiceConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.token_secret.is_some() {
            config.token_secret = self.token_secret;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        ServiceConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "worship_api={level},worship_common={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting worship-api v{}", env!("CARGO_PKG_VERSION"));

    let secret = match config.token_secret.clone() {
        Some(secret) => secret,
        None => {
            warn!("No token secret configured, generated one for this run; tokens will not survive a restart");
            generate_secret()
        }
    };

    let store = Arc::new(Store::new());
    let seeded = seed_store(&store)
        .await
        .context("Failed to seed store")?;
    info!(
        "Store ready: {} members, {} songs",
        seeded.members, seeded.songs
    );

    let limiter = RateLimiter::new(
        config.rate_limit_max,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    if !limiter.is_enabled() {
        info!("Rate limiting disabled");
    }

    let auth = AuthSettings::new(secret, time::hours(config.token_ttl_hours));
    let state = AppState::new(store, auth, limiter);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;

    info!("worship-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("worship-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
