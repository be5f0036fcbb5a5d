//! Unit tests for configuration resolution
//!
//! Tests the priority order CLI → ENV → TOML → compiled default and the
//! graceful handling of missing or unreadable TOML files.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TIRESEARCH_* variables are marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tiresearch_common::config::{
    default_database_path, CliOverrides, ResolvedConfig, TomlConfig, DEFAULT_BIND, DEFAULT_PORT,
    ENV_BIND, ENV_CATALOG, ENV_DATABASE, ENV_PORT,
};
use tiresearch_common::Error;

fn clear_env() {
    env::remove_var(ENV_DATABASE);
    env::remove_var(ENV_CATALOG);
    env::remove_var(ENV_PORT);
    env::remove_var(ENV_BIND);
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let resolved = ResolvedConfig::resolve(CliOverrides::default(), &TomlConfig::default()).unwrap();

    assert_eq!(resolved.database_path, default_database_path());
    assert!(resolved.database_path.ends_with("tires.db"));
    assert_eq!(resolved.catalog_path, None);
    assert_eq!(resolved.bind, DEFAULT_BIND);
    assert_eq!(resolved.port, DEFAULT_PORT);
    assert_eq!(resolved.log_level, "info");
}

#[test]
#[serial]
fn test_toml_values_used_when_no_overrides() {
    clear_env();

    let toml_config: TomlConfig = toml::from_str(
        r#"
        database_path = "/srv/tires/tires.db"
        catalog_path = "/srv/tires/catalog.toml"
        port = 8080

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let resolved = ResolvedConfig::resolve(CliOverrides::default(), &toml_config).unwrap();

    assert_eq!(resolved.database_path, PathBuf::from("/srv/tires/tires.db"));
    assert_eq!(resolved.catalog_path, Some(PathBuf::from("/srv/tires/catalog.toml")));
    assert_eq!(resolved.port, 8080);
    assert_eq!(resolved.bind, DEFAULT_BIND);
    assert_eq!(resolved.log_level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_DATABASE, "/tmp/tiresearch-env.db");
    env::set_var(ENV_PORT, "9001");

    let toml_config = TomlConfig {
        database_path: Some(PathBuf::from("/srv/tires/tires.db")),
        port: Some(8080),
        ..Default::default()
    };

    let resolved = ResolvedConfig::resolve(CliOverrides::default(), &toml_config).unwrap();
    assert_eq!(resolved.database_path, PathBuf::from("/tmp/tiresearch-env.db"));
    assert_eq!(resolved.port, 9001);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_DATABASE, "/tmp/tiresearch-env.db");
    env::set_var(ENV_BIND, "0.0.0.0");

    let cli = CliOverrides {
        database: Some(PathBuf::from("/tmp/tiresearch-cli.db")),
        bind: Some("10.0.0.5".to_string()),
        port: Some(7000),
        ..Default::default()
    };

    let resolved = ResolvedConfig::resolve(cli, &TomlConfig::default()).unwrap();
    assert_eq!(resolved.database_path, PathBuf::from("/tmp/tiresearch-cli.db"));
    assert_eq!(resolved.bind, "10.0.0.5");
    assert_eq!(resolved.port, 7000);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_port_is_config_error() {
    clear_env();
    env::set_var(ENV_PORT, "not-a-port");

    let result = ResolvedConfig::resolve(CliOverrides::default(), &TomlConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
fn test_load_explicit_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "catalog_path = \"catalog.toml\"\nbind = \"0.0.0.0\"").unwrap();

    let config = TomlConfig::load_or_default(Some(file.path())).unwrap();
    assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.toml")));
    assert_eq!(config.bind.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_explicit_missing_file_is_error() {
    let result = TomlConfig::load_or_default(Some(std::path::Path::new(
        "/nonexistent/tiresearch/config.toml",
    )));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_file_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"eighty\"").unwrap();

    assert!(matches!(TomlConfig::load(file.path()), Err(Error::Config(_))));
}
