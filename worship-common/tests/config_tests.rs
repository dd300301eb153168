//! Unit tests for configuration loading
//!
//! Tests cover:
//! - Compiled defaults
//! - TOML overlay (explicit path and WORSHIP_CONFIG)
//! - Missing and malformed files
//! - Validation of merged values
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that touch WORSHIP_CONFIG are marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use worship_common::config::{resolve_config_path, ServiceConfig, TomlConfig, CONFIG_ENV_VAR};
use worship_common::Error;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Should create temp file");
    file.write_all(content.as_bytes()).expect("Should write config");
    file
}

#[test]
fn test_defaults() {
    let config = ServiceConfig::default();

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3000);
    assert_eq!(config.token_secret, None);
    assert_eq!(config.token_ttl_hours, 24);
    assert_eq!(config.rate_limit_max, 100);
    assert_eq!(config.rate_limit_window_secs, 900);
    assert_eq!(config.log_level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_explicit_file_overrides_defaults() {
    let file = write_config(
        r#"
port = 8080
token_secret = "from-file"
rate_limit_max = 0
"#,
    );

    let config = ServiceConfig::load(Some(file.path())).expect("Should load config");

    assert_eq!(config.port, 8080);
    assert_eq!(config.token_secret.as_deref(), Some("from-file"));
    assert_eq!(config.rate_limit_max, 0);
    // Untouched keys keep their defaults
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.token_ttl_hours, 24);
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = ServiceConfig::load(Some(&missing));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_file_is_error() {
    let file = write_config("port = \"not a number\"\n");
    let result = ServiceConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::TomlParse(_))));
}

#[test]
fn test_unknown_key_is_error() {
    let file = write_config("prot = 8080\n");
    assert!(ServiceConfig::load(Some(file.path())).is_err());
}

#[test]
fn test_invalid_values_rejected() {
    let file = write_config("token_ttl_hours = 0\n");
    assert!(matches!(
        ServiceConfig::load(Some(file.path())),
        Err(Error::Config(_))
    ));

    let file = write_config("rate_limit_window_secs = 0\n");
    assert!(ServiceConfig::load(Some(file.path())).is_err());

    // Window of zero is fine once limiting is off
    let file = write_config("rate_limit_max = 0\nrate_limit_window_secs = 0\n");
    assert!(ServiceConfig::load(Some(file.path())).is_ok());
}

#[test]
fn test_merge_toml_only_present_keys() {
    let mut config = ServiceConfig::default();
    config.merge_toml(TomlConfig {
        host: Some("0.0.0.0".to_string()),
        ..Default::default()
    });

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 3000);
}

#[test]
#[serial]
fn test_env_var_path_used_when_no_explicit_path() {
    let file = write_config("port = 9000\n");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let resolved = resolve_config_path(None);
    let config = ServiceConfig::load(None);

    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(resolved.as_deref(), Some(file.path()));
    assert_eq!(config.unwrap().port, 9000);
}

#[test]
#[serial]
fn test_explicit_path_beats_env_var() {
    let env_file = write_config("port = 9000\n");
    let explicit = write_config("port = 9100\n");
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let config = ServiceConfig::load(Some(explicit.path()));

    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.unwrap().port, 9100);
}

#[test]
#[serial]
fn test_env_var_pointing_at_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    env::set_var(CONFIG_ENV_VAR, dir.path().join("absent.toml"));

    let config = ServiceConfig::load(None);

    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.unwrap(), ServiceConfig::default());
}

#[test]
#[serial]
fn test_resolve_without_env_uses_platform_dir() {
    env::remove_var(CONFIG_ENV_VAR);

    if let Some(path) = resolve_config_path(None) {
        assert!(path.ends_with(Path::new("worship").join("config.toml")));
    }
}
