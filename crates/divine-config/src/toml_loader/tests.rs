//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_parse_error() {
    let result = load_from_path(Path::new("/tmp/nonexistent_divine_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, divine_common::ConfigError::ParseError(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[model]
name = "gemini-2.5-flash"
stream = false

[access]
require_sign_in = false
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.model.name, "gemini-2.5-flash");
    assert!(!config.model.stream);
    assert!(!config.access.require_sign_in);
    // Defaults preserved
    assert_eq!(config.model.max_tokens, 8192);
    assert_eq!(config.access.free_messages, 3);
    assert_eq!(config.voice.model, "whisper-1");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, divine_common::ConfigError::ParseError(_)));
}

#[test]
fn out_of_range_values_are_returned_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[model]\nmax_tokens = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.model.max_tokens, 0);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("divine").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.model.name, "gemini-2.5-pro");
    assert!(config.access.require_sign_in);
}

#[test]
fn default_config_toml_is_valid() {
    use super::template::default_config_toml;
    use crate::schema::DivineConfig;

    let config: DivineConfig = toml::from_str(&default_config_toml()).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_config_path_is_reasonable() {
    // Not every CI environment has a config dir.
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("divine"));
        assert!(path_str.ends_with("config.toml"));
    }
}
