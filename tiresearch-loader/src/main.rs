//! tiresearch-loader - rebuild the tire database from the catalog
//!
//! Opens (or creates) the database, then clears and repopulates the `tires`
//! table from the catalog in a single transaction. Prints the run report as
//! JSON on success; exits non-zero if the rebuild fails.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tiresearch_common::catalog::Catalog;
use tiresearch_common::config::{CliOverrides, ResolvedConfig, TomlConfig};
use tiresearch_common::db::init_database;
use tiresearch_loader::loader::{collect_candidates, Rejection};
use tiresearch_loader::rebuild_catalog;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "tiresearch-loader")]
#[command(about = "Rebuild the tire search database from a catalog")]
#[command(version)]
struct Args {
    /// Catalog file (TOML)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Validate the catalog and report rejections without touching the database
    #[arg(long)]
    check: bool,
}

/// `--check` output
#[derive(Debug, Serialize)]
struct CheckReport {
    accepted: usize,
    rejected: Vec<Rejection>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config loading logs too, so start at RUST_LOG or info and apply the
    // configured level once it is known
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().ok();
    let level_from_env = env_filter.is_some();
    let (filter, filter_handle) = tracing_subscriber::reload::Layer::new(
        env_filter.unwrap_or_else(|| tracing_subscriber::EnvFilter::new("info")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref())?;
    let config = ResolvedConfig::resolve(
        CliOverrides {
            database: args.database,
            catalog: args.catalog,
            ..Default::default()
        },
        &toml_config,
    )?;

    if !level_from_env {
        if let Err(e) =
            filter_handle.reload(tracing_subscriber::EnvFilter::new(&config.log_level))
        {
            warn!("Failed to apply log level {}: {}", config.log_level, e);
        }
    }

    info!(
        "Starting tiresearch-loader v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let catalog_path = config
        .catalog_path
        .clone()
        .ok_or_else(|| anyhow!("No catalog given (use --catalog or TIRESEARCH_CATALOG)"))?;
    info!("Catalog: {}", catalog_path.display());

    let catalog = Catalog::from_file(&catalog_path)?;

    if args.check {
        let set = tokio::task::spawn_blocking(move || collect_candidates(&catalog))
            .await
            .context("Catalog reader task failed")??;
        let report = CheckReport {
            accepted: set.accepted.len(),
            rejected: set.rejected,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    info!("Database: {}", config.database_path.display());
    let pool = init_database(&config.database_path).await?;

    match rebuild_catalog(&pool, &catalog, Some(&catalog_path)).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            pool.close().await;
            Ok(())
        }
        Err(e) => {
            error!("Catalog rebuild failed, previous data kept: {}", e);
            pool.close().await;
            Err(e.into())
        }
    }
}
