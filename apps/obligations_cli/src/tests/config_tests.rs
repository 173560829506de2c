use super::{apply_env, apply_file, load_settings_with, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

#[test]
fn defaults_point_at_local_ledger() {
    let settings = Settings::default();
    assert_eq!(settings.api_base, "http://localhost:10050/api/obligations/");
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
api_base = "http://bank-a:8080/api/obligations"
request_timeout_secs = "5"
log_filter = "obligation_client=debug"
"#,
    )
    .expect("parse");

    assert_eq!(settings.api_base, "http://bank-a:8080/api/obligations");
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(settings.log_filter, "obligation_client=debug");

    apply_file(&mut settings, "request_timeout_secs = 12").expect("parse");
    assert_eq!(settings.request_timeout_secs, 12);
}

#[test]
fn invalid_timeouts_are_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "request_timeout_secs = \"soon\"").expect("parse");
    apply_file(&mut settings, "request_timeout_secs = -3").expect("parse");
    apply_file(&mut settings, "request_timeout_secs = 0").expect("parse");
    assert_eq!(settings.request_timeout_secs, 30);

    let vars = HashMap::from([("OBLIGATIONS_TIMEOUT_SECS", "never")]);
    apply_env(&mut settings, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "api_base = ").is_err());
}

#[test]
fn env_overrides_file_and_prefers_app_prefix() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "api_base = \"http://from-file/\"").expect("parse");

    let vars = HashMap::from([
        ("OBLIGATIONS_API_BASE", "http://from-env/"),
        ("APP__API_BASE", "http://from-app-env/"),
        ("OBLIGATIONS_TIMEOUT_SECS", "9"),
        ("RUST_LOG", "warn"),
    ]);
    apply_env(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.api_base, "http://from-app-env/");
    assert_eq!(settings.request_timeout_secs, 9);
    assert_eq!(settings.log_filter, "warn");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("obligations_missing_{suffix}.toml"));

    let settings = load_settings_with(&path, |_| None).expect("settings");
    assert_eq!(settings, Settings::default());
}

#[test]
fn reads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("obligations_cli_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("obligations.toml");
    fs::write(&path, "request_timeout_secs = 7\n").expect("write");

    let settings = load_settings_with(&path, |_| None).expect("settings");
    assert_eq!(settings.request_timeout_secs, 7);
    assert_eq!(settings.api_base, Settings::default().api_base);

    let vars = HashMap::from([("OBLIGATIONS_TIMEOUT_SECS", "11")]);
    let settings =
        load_settings_with(&path, |key| vars.get(key).map(|v| v.to_string())).expect("settings");
    assert_eq!(settings.request_timeout_secs, 11);

    fs::remove_dir_all(temp_root).expect("cleanup");
}
