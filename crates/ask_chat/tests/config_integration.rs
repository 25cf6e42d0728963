//! Integration tests for config load/save.

use ask_chat::{config, Config, SubmissionPolicy};
use predicates::prelude::*;
use std::time::Duration;

#[test]
fn load_existing_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        r#"
server:
  base_url: "http://localhost:5000"
  timeout_secs: 30
widget:
  header: "Muni Mascotas"
  placeholder: "Escribe tu pregunta..."
  user_label: "Tú"
  bot_label: "Bot"
  submission: concurrent
"#,
    )
    .unwrap();

    let cfg = config::load(&config_path).expect("load should succeed");
    assert_eq!(cfg.server.base_url.as_deref(), Some("http://localhost:5000"));
    assert_eq!(cfg.base_url(), "http://localhost:5000");
    assert_eq!(cfg.timeout(), Some(Duration::from_secs(30)));

    let options = cfg.widget_options();
    assert_eq!(options.layout.header, "Muni Mascotas");
    assert_eq!(options.layout.user_label, "Tú");
    assert_eq!(options.policy, SubmissionPolicy::Concurrent);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let cfg = config::parse("widget:\n  bot_label: Asistente\n").unwrap();
    assert_eq!(cfg.base_url(), config::DEFAULT_BASE_URL);
    assert_eq!(cfg.timeout(), None);

    let options = cfg.widget_options();
    assert_eq!(options.layout.header, "Chatbot PDF");
    assert_eq!(options.layout.bot_label, "Asistente");
    assert_eq!(options.policy, SubmissionPolicy::Serial);

    let empty = config::parse("").unwrap();
    assert_eq!(empty.base_url(), config::DEFAULT_BASE_URL);
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let err = config::parse("widget:\n  submission: sometimes\n").unwrap_err();
    assert!(matches!(err, config::ConfigError::Parse(_)), "got {err:?}");
}

#[test]
fn explicit_missing_file_is_an_error_but_default_is_not() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");

    let err = config::load(&missing).unwrap_err();
    assert!(matches!(err, config::ConfigError::Io { .. }));
    let pred = predicates::str::contains("nope.yaml");
    assert!(pred.eval(&err.to_string()));

    let cfg = config::load_or_default(&missing).expect("missing file means defaults");
    assert!(cfg.server.base_url.is_none());
}

#[test]
fn save_creates_directory_and_file_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("ask-chat");
    let config_path = config_dir.join("config.yaml");
    assert!(!config_dir.exists(), "config dir should not exist yet");

    let mut cfg = Config::default();
    cfg.server.base_url = Some("http://127.0.0.1:5001".into());
    cfg.widget.submission = Some(SubmissionPolicy::Concurrent);

    config::save(&config_path, &cfg).expect("save should succeed");
    let pred = predicates::path::exists();
    assert!(pred.eval(&config_path), "config file should exist after save");

    let contents = std::fs::read_to_string(&config_path).unwrap();
    assert!(predicates::str::contains("base_url").eval(&contents));
    assert!(predicates::str::contains("submission: concurrent").eval(&contents));
    // Unset options are not written out.
    assert!(predicates::str::contains("timeout_secs").not().eval(&contents));

    let reloaded = config::load(&config_path).expect("reload should succeed");
    assert_eq!(reloaded.server.base_url, cfg.server.base_url);
    assert_eq!(reloaded.widget.submission, cfg.widget.submission);
}

/// Config path resolves to `~/.ask-chat/config.yaml` using the current platform's home dir.
#[test]
fn default_config_path_uses_home_directory() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_str().unwrap().to_string();

    let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let original = std::env::var(key).ok();

    std::env::set_var(key, &home);
    let path = config::default_config_path();
    match original {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }

    let path = path.expect("should resolve a config path");
    let expected = dir.path().join(".ask-chat").join("config.yaml");
    assert_eq!(path, expected);
}
