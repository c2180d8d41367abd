//! Unit tests for configuration and graceful degradation
//!
//! Tests cover:
//! - Root folder priority order (CLI > env > TOML > default)
//! - TOML parsing with partial and empty files
//! - Ledger path resolution
//! - Root folder creation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate ASSETMAP_ROOT_FOLDER or ASSETMAP_ROOT are marked
//! with #[serial] so they run sequentially.

use assetmap_common::config::{
    load_toml_config, read_toml_config, CompiledDefaults, ConfigSource, LoggingConfig,
    RootFolderInitializer, RootFolderResolver, StorageMode, TomlConfig, ROOT_ENV, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_root_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    env::remove_var(ROOT_ENV);
}

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.port, 5780);
    assert_eq!(defaults.bind_address, "127.0.0.1");
    assert_eq!(defaults.storage, StorageMode::File);
    assert_eq!(defaults.ledger_file_name, "assets.json");
    assert_eq!(defaults.max_upload_bytes, 10 * 1024 * 1024);

    #[cfg(target_os = "linux")]
    {
        let path_str = defaults.root_folder.to_string_lossy();
        assert!(path_str.contains("assetmap"));
    }
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_root_env();

    let root_folder = RootFolderResolver::new("test-module").resolve();

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_root_folder() {
    clear_root_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/assetmap-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/assetmap-test-env-folder"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_root_folder_env_takes_precedence() {
    clear_root_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/assetmap-priority-1");
    env::set_var(ROOT_ENV, "/tmp/assetmap-priority-2");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/assetmap-priority-1"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_alternative_env_var() {
    clear_root_env();
    env::set_var(ROOT_ENV, "/tmp/assetmap-test-env-root");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/assetmap-test-env-root"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_cli_beats_env_and_toml() {
    clear_root_env();
    env::set_var(ROOT_FOLDER_ENV, "/tmp/assetmap-env");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/assetmap-cli")))
        .with_toml_root(Some(PathBuf::from("/tmp/assetmap-toml")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/assetmap-cli"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    clear_root_env();
    env::set_var(ROOT_ENV, "/tmp/assetmap-env");

    let root_folder = RootFolderResolver::new("test-module")
        .with_toml_root(Some(PathBuf::from("/tmp/assetmap-toml")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/assetmap-env"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_toml_used_without_env() {
    clear_root_env();

    let root_folder = RootFolderResolver::new("test-module")
        .with_toml_root(Some(PathBuf::from("/tmp/assetmap-toml")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/assetmap-toml"));
}

#[test]
fn test_read_full_toml_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/assetmap"
port = 6000
bind_address = "0.0.0.0"
storage = "memory"
ledger_file = "ledger.json"
max_upload_bytes = 2048

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = read_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/assetmap")));
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.storage, Some(StorageMode::Memory));
    assert_eq!(config.ledger_file, Some(PathBuf::from("ledger.json")));
    assert_eq!(config.max_upload_bytes, Some(2048));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_empty_toml_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();

    let config = read_toml_config(&path).unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.logging, LoggingConfig::default());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_explicit_config_reports_source() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = 7000\n").unwrap();

    let loaded = load_toml_config(Some(path.as_path())).unwrap();
    assert_eq!(loaded.config.port, Some(7000));
    assert_eq!(loaded.source, ConfigSource::Explicit(path.clone()));
    assert!(loaded.source.to_string().contains("config.toml"));
}

#[test]
fn test_explicit_missing_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    assert!(load_toml_config(Some(path.as_path())).is_err());
}

#[test]
fn test_explicit_malformed_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(load_toml_config(Some(path.as_path())).is_err());
}

#[test]
fn test_storage_mode_parsing() {
    assert_eq!("memory".parse::<StorageMode>().unwrap(), StorageMode::Memory);
    assert_eq!(" FILE ".parse::<StorageMode>().unwrap(), StorageMode::File);
    assert!("sqlite".parse::<StorageMode>().is_err());
    assert_eq!(StorageMode::Memory.to_string(), "memory");
}

#[test]
fn test_ledger_path_resolution() {
    let init = RootFolderInitializer::new(PathBuf::from("/data/assetmap"));

    assert_eq!(init.ledger_path(None), PathBuf::from("/data/assetmap/assets.json"));
    assert_eq!(
        init.ledger_path(Some(PathBuf::from("custom.json").as_path())),
        PathBuf::from("/data/assetmap/custom.json")
    );
    assert_eq!(
        init.ledger_path(Some(PathBuf::from("/elsewhere/ledger.json").as_path())),
        PathBuf::from("/elsewhere/ledger.json")
    );
}

#[test]
fn test_initializer_creates_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("nested").join("root");

    let init = RootFolderInitializer::new(root.clone());
    init.ensure_directory_exists().unwrap();
    assert!(root.is_dir());

    // Second call is a no-op
    init.ensure_directory_exists().unwrap();
}

#[test]
fn test_initializer_rejects_file_as_root() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();

    let init = RootFolderInitializer::new(file);
    assert!(init.ensure_directory_exists().is_err());
}
