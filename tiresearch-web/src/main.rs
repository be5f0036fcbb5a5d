//! tiresearch-web - tire search HTTP service
//!
//! Serves the search endpoints, the search form options, and the
//! loopback-only admin endpoints over one SQLite database built by
//! tiresearch-loader.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tiresearch_common::config::{CliOverrides, ResolvedConfig, TomlConfig};
use tiresearch_common::db::init_database;
use tiresearch_web::{build_router, AppState};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "tiresearch-web")]
#[command(about = "Tire search HTTP service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Catalog file used by POST /admin/reload
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config loading logs too, so start at RUST_LOG or info and apply the
    // configured level once it is known
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().ok();
    let level_from_env = env_filter.is_some();
    let (filter, filter_handle) = tracing_subscriber::reload::Layer::new(
        env_filter.unwrap_or_else(|| tracing_subscriber::EnvFilter::new("info,tower_http=info")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref())?;
    let config = ResolvedConfig::resolve(
        CliOverrides {
            database: args.database,
            catalog: args.catalog,
            bind: args.bind,
            port: args.port,
        },
        &toml_config,
    )?;

    if !level_from_env {
        let configured =
            tracing_subscriber::EnvFilter::new(format!("{},tower_http=info", config.log_level));
        if let Err(e) = filter_handle.reload(configured) {
            warn!("Failed to apply log level {}: {}", config.log_level, e);
        }
    }

    // Build identification first, before any database delay
    info!(
        "Starting tiresearch-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Database path: {}", config.database_path.display());
    let pool = match init_database(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match &config.catalog_path {
        Some(path) => info!("Catalog for reloads: {}", path.display()),
        None => info!("No catalog configured, POST /admin/reload disabled"),
    }

    let state = AppState::new(pool.clone(), config.catalog_path.clone());
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("tiresearch-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
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
