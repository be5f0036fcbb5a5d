//! Configuration loading and resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is never fatal; the compiled defaults are used instead.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the database path
pub const ENV_DATABASE: &str = "TIRESEARCH_DATABASE";
/// Environment variable overriding the catalog path
pub const ENV_CATALOG: &str = "TIRESEARCH_CATALOG";
/// Environment variable overriding the HTTP port
pub const ENV_PORT: &str = "TIRESEARCH_PORT";
/// Environment variable overriding the HTTP bind address
pub const ENV_BIND: &str = "TIRESEARCH_BIND";

/// Default HTTP port for tiresearch-web
pub const DEFAULT_PORT: u16 = 5730;
/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Bootstrap configuration loaded from TOML file
///
/// All fields are optional; anything left out falls through to the
/// compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Path to the tire catalog (TOML) consumed by the loader
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// HTTP bind address
    #[serde(default)]
    pub bind: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file, falling back to defaults when none exists
    ///
    /// An explicitly requested file must exist and parse. A discovered file
    /// that fails to parse is logged and ignored.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::load(path);
        }

        match find_config_file() {
            Some(path) => match Self::load(&path) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    Ok(config)
                }
                Err(e) => {
                    warn!("Ignoring unreadable config file: {}", e);
                    Ok(Self::default())
                }
            },
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Command-line overrides, highest priority tier
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub database_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub bind: String,
    pub port: u16,
    pub log_level: String,
}

impl ResolvedConfig {
    /// Resolve every setting through CLI → ENV → TOML → default
    pub fn resolve(cli: CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let database_path = resolve_path(
            cli.database,
            ENV_DATABASE,
            toml_config.database_path.clone(),
        )
        .unwrap_or_else(default_database_path);

        let catalog_path = resolve_path(cli.catalog, ENV_CATALOG, toml_config.catalog_path.clone());

        let bind = cli
            .bind
            .or_else(|| std::env::var(ENV_BIND).ok())
            .or_else(|| toml_config.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = match cli.port {
            Some(port) => port,
            None => match std::env::var(ENV_PORT) {
                Ok(value) => value.parse::<u16>().map_err(|e| {
                    Error::Config(format!("Invalid {} '{}': {}", ENV_PORT, value, e))
                })?,
                Err(_) => toml_config.port.unwrap_or(DEFAULT_PORT),
            },
        };

        Ok(Self {
            database_path,
            catalog_path,
            bind,
            port,
            log_level: toml_config.logging.level.clone(),
        })
    }
}

fn resolve_path(
    cli_arg: Option<PathBuf>,
    env_var_name: &str,
    toml_value: Option<PathBuf>,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if cli_arg.is_some() {
        return cli_arg;
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    toml_value
}

/// Locate the platform config file, if one exists
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tiresearch").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tiresearch/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tiresearch"))
        .unwrap_or_else(|| PathBuf::from("./tiresearch_data"))
        .join("tires.db")
}
