//! Configuration loading and root folder resolution
//!
//! Tests that touch RDESK_ROOT_FOLDER or RDESK_CONFIG are marked #[serial]
//! so they never race on the process environment.

use rdesk_common::config::{
    load_toml_config, write_toml_config, ApprovalMode, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_default_root_is_named_after_app() {
    let defaults = CompiledDefaults::for_current_platform();
    assert!(defaults.root_folder.ends_with("rdesk"));
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root = RootFolderResolver::new("test").resolve();
    assert_eq!(root, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_cli_argument_beats_environment() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/rdesk-from-env");

    let root = RootFolderResolver::new("test")
        .with_cli_arg(Some(PathBuf::from("/tmp/rdesk-from-cli")))
        .resolve();
    assert_eq!(root, PathBuf::from("/tmp/rdesk-from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_environment_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/rdesk-from-env");

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/rdesk-from-toml")),
        ..Default::default()
    };
    let root = RootFolderResolver::new("test").with_toml(toml.clone()).resolve();
    assert_eq!(root, PathBuf::from("/tmp/rdesk-from-env"));

    env::remove_var(ROOT_FOLDER_ENV);
    let root = RootFolderResolver::new("test").with_toml(toml).resolve();
    assert_eq!(root, PathBuf::from("/tmp/rdesk-from-toml"));
}

#[test]
#[serial]
fn test_blank_environment_value_is_ignored() {
    env::set_var(ROOT_FOLDER_ENV, "   ");
    let root = RootFolderResolver::new("test").resolve();
    assert_eq!(root, CompiledDefaults::for_current_platform().root_folder);
    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
fn test_initializer_creates_layout() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("nested").join("rdesk");

    let init = RootFolderInitializer::new(root.clone());
    init.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert!(init.uploads_path().is_dir());
    assert_eq!(init.database_path(), root.join("rdesk.db"));
}

#[test]
fn test_write_then_load_config() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("conf").join("rdesk.toml");

    let mut config = TomlConfig::default();
    config.approval_mode = ApprovalMode::Auto;
    config.bind_addr = "0.0.0.0:8080".into();
    config.lookup.rate_per_second = 3;

    write_toml_config(&config, &path).unwrap();
    assert!(!path.with_extension("toml.tmp").exists());

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_unparseable_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("rdesk.toml");
    std::fs::write(&path, "approval_mode = [not valid").unwrap();

    assert!(load_toml_config(&path).is_err());
    assert!(load_toml_config(&temp.path().join("missing.toml")).is_err());
}
