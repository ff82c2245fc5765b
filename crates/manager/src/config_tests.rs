// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::io::Write;

#[test]
fn empty_file_yields_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.operation_timeout(), Duration::from_secs(10));
    assert_eq!(config.resync_period(), None);
}

#[test]
fn parses_all_fields() {
    let config = Config::from_toml_str(
        r#"
namespace = "workspaces"
ingress_host = "ws.example.com"
workspace_port_url_template = "https://{{ .Host }}:{{ .IngressPort }}"
operation_timeout_ms = 2500
resync_period_ms = 30000
status_channel_capacity = 8
slow_handler_ms = 50
"#,
    )
    .unwrap();

    assert_eq!(config.namespace, "workspaces");
    assert_eq!(config.operation_timeout(), Duration::from_millis(2500));
    assert_eq!(config.resync_period(), Some(Duration::from_secs(30)));
    assert!(config.url_template().unwrap().is_some());

    let cache = config.cache_config();
    assert_eq!(cache.namespace, "workspaces");
    assert_eq!(cache.slow_handler, Duration::from_millis(50));
}

#[test]
fn unknown_template_variable_fails_load() {
    let err = Config::from_toml_str(r#"workspace_port_url_template = "{{ .Nope }}""#).unwrap_err();
    assert!(matches!(err, ConfigError::Template(_)), "{err}");
}

#[test]
fn unknown_field_fails_load() {
    let err = Config::from_toml_str("namespase = \"x\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn zero_capacity_is_invalid() {
    let err = Config::from_toml_str("status_channel_capacity = 0").unwrap_err();
    assert!(err.to_string().contains("status_channel_capacity"));
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "namespace = \"from-file\"").unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.namespace, "from-file");
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "namespace = \"from-file\"\noperation_timeout_ms = 100").unwrap();

    std::env::set_var("WSMAN_CONFIG", file.path());
    std::env::set_var("WSMAN_NAMESPACE", "from-env");
    std::env::set_var("WSMAN_OPERATION_TIMEOUT_MS", "750");
    let config = Config::from_env();
    std::env::remove_var("WSMAN_CONFIG");
    std::env::remove_var("WSMAN_NAMESPACE");
    std::env::remove_var("WSMAN_OPERATION_TIMEOUT_MS");

    let config = config.unwrap();
    assert_eq!(config.namespace, "from-env");
    assert_eq!(config.operation_timeout(), Duration::from_millis(750));
}

#[test]
#[serial]
fn from_env_without_config_file_uses_defaults() {
    std::env::remove_var("WSMAN_CONFIG");
    std::env::set_var("WSMAN_OPERATION_TIMEOUT_MS", "not-a-number");
    let config = Config::from_env();
    std::env::remove_var("WSMAN_OPERATION_TIMEOUT_MS");

    assert_eq!(config.unwrap(), Config::default());
}
