//! Tests for TOML configuration loading and graceful degradation
//!
//! A missing or malformed config file must never stop the service from
//! starting; it falls back to defaults.

use catalog_common::config::{
    ensure_data_dir, load_toml_config, load_toml_config_or_default, CompletionToml, TomlConfig,
    DATABASE_FILE_NAME,
};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_full_toml_parses() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
data_dir = "/srv/catalog"
bind = "0.0.0.0:8080"

[completion]
base_url = "http://localhost:11434/v1"
model = "llama3"
api_key = "sk-test"
timeout_secs = 15
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();

    assert_eq!(
        config,
        TomlConfig {
            data_dir: Some(PathBuf::from("/srv/catalog")),
            bind: Some("0.0.0.0:8080".to_string()),
            completion: CompletionToml {
                base_url: Some("http://localhost:11434/v1".to_string()),
                model: Some("llama3".to_string()),
                api_key: Some("sk-test".to_string()),
                timeout_secs: Some(15),
            },
        }
    );
}

#[test]
fn test_partial_toml_leaves_other_fields_unset() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "bind = \"127.0.0.1:9000\"\n").unwrap();

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.bind.as_deref(), Some("127.0.0.1:9000"));
    assert!(config.data_dir.is_none());
    assert_eq!(config.completion, CompletionToml::default());
}

#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    let config = load_toml_config_or_default(Some(&path));

    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "bind = [unclosed").unwrap();

    assert!(load_toml_config(&path).is_err());
    assert_eq!(load_toml_config_or_default(Some(&path)), TomlConfig::default());
}

#[test]
fn test_ensure_data_dir_creates_folder() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");

    let db_path = ensure_data_dir(&data_dir).unwrap();

    assert!(data_dir.is_dir());
    assert_eq!(db_path, data_dir.join(DATABASE_FILE_NAME));
}
