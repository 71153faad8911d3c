//! Unit tests for configuration and root folder resolution
//!
//! Uses serial_test to prevent ENV variable race conditions: tests that
//! manipulate LYRICLE_ROOT_FOLDER are marked with #[serial].

use lyricle_common::config::{
    load_toml_config, load_toml_config_if_present, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("test-module").resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/lyricle-test-env-folder");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/lyricle-test-toml-folder")),
        ..Default::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_toml_config(&config)
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(root_folder, PathBuf::from("/tmp/lyricle-test-env-folder"));
}

#[test]
#[serial]
fn test_resolver_cli_arg_has_highest_priority() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/lyricle-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/lyricle-test-cli-folder")))
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(root_folder, PathBuf::from("/tmp/lyricle-test-cli-folder"));
}

#[test]
#[serial]
fn test_resolver_uses_toml_when_env_missing() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/lyricle-test-toml-folder")),
        ..Default::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_toml_config(&config)
        .resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/lyricle-test-toml-folder"));
}

#[test]
fn test_initializer_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("a").join("b");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("lyricle.db"));
}

#[test]
fn test_load_toml_config_full_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lyricle-import.toml");
    std::fs::write(
        &path,
        r#"
        root_folder = "/srv/lyricle"

        [logging]
        level = "debug"

        [provider]
        request_timeout_secs = 10
        "#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/lyricle")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.provider.request_timeout_secs, 10);
    assert_eq!(config.provider.language, "en");
}

#[test]
fn test_missing_toml_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_toml_config_if_present(Some(&temp_dir.path().join("absent.toml"))).unwrap();

    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");

    let config = load_toml_config_if_present(None).unwrap();
    assert!(config.root_folder.is_none());
}

#[test]
fn test_malformed_toml_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    let err = load_toml_config_if_present(Some(&path)).unwrap_err();
    assert!(matches!(err, lyricle_common::Error::Config(_)));
    assert!(err.to_string().contains("broken.toml"), "unexpected message: {}", err);
}

#[test]
fn test_wrong_value_type_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("typed.toml");
    std::fs::write(&path, "[provider]\nrequest_timeout_secs = \"soon\"\n").unwrap();

    assert!(load_toml_config_if_present(Some(&path)).is_err());
}
