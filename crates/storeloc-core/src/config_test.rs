use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("STORELOC_API_URL", "https://api.example.com/widget-data");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STORELOC_ENV"));
}

#[test]
fn build_app_config_fails_without_api_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STORELOC_API_URL"),
        "expected MissingEnvVar(STORELOC_API_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_blank_api_url() {
    let mut map = HashMap::new();
    map.insert("STORELOC_API_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_non_http_api_url() {
    let mut map = HashMap::new();
    map.insert("STORELOC_API_URL", "ftp://example.com/data");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORELOC_API_URL"),
        "expected InvalidEnvVar(STORELOC_API_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_url, "https://api.example.com/widget-data");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.user_agent, "storeloc/0.1 (store-locator-widget)");
    assert!(cfg.asset_base_url.is_none());
    assert_eq!(cfg.notice_duration_ms, 5000);
    assert!(cfg.instance.is_none());
    assert!(cfg.comp_id.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = full_env();
    map.insert("STORELOC_ENV", "production");
    map.insert("STORELOC_REQUEST_TIMEOUT_SECS", "30");
    map.insert("STORELOC_ASSET_BASE_URL", "https://cdn.example.com/widget");
    map.insert("STORELOC_NOTICE_DURATION_MS", "1500");
    map.insert("STORELOC_INSTANCE", "signed.instance.token");
    map.insert("STORELOC_COMP_ID", "comp-abc123");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(
        cfg.asset_base_url.as_deref(),
        Some("https://cdn.example.com/widget")
    );
    assert_eq!(cfg.notice_duration_ms, 1500);
    assert_eq!(cfg.instance.as_deref(), Some("signed.instance.token"));
    assert_eq!(cfg.comp_id.as_deref(), Some("comp-abc123"));
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = full_env();
    map.insert("STORELOC_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORELOC_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(STORELOC_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn blank_optional_values_are_treated_as_absent() {
    let mut map = full_env();
    map.insert("STORELOC_INSTANCE", "");
    map.insert("STORELOC_ASSET_BASE_URL", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.instance.is_none());
    assert!(cfg.asset_base_url.is_none());
}

#[test]
fn debug_output_redacts_instance_credential() {
    let mut map = full_env();
    map.insert("STORELOC_INSTANCE", "super-secret-instance");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret-instance"));
    assert!(rendered.contains("[redacted]"));
}
