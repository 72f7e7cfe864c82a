//! Integration tests for layered configuration loading

use ecctool_verify::config::{global_config_path, ConfigLoader};
use ecctool_verify::output::Partition;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use crate::integration::with_xdg_env;

fn write(path: &std::path::Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let config = with_xdg_env(&test_dir, || ConfigLoader::load(&workspace)).unwrap();
    assert_eq!(config.ecctool.path, PathBuf::from("ecctool"));
    assert_eq!(config.ecctool.subcommand, "repair-status");
    assert_eq!(config.poll.policy().interval, Duration::from_secs(1));
    assert_eq!(config.poll.policy().timeout, Duration::from_secs(150));
    assert_eq!(config.output.partition, Partition::Markers);
}

#[test]
fn test_global_file_resolves_under_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    let path = with_xdg_env(&test_dir, global_config_path).unwrap();
    assert_eq!(
        path,
        test_dir.path().join("ecctool-verify").join("config.toml")
    );
}

#[test]
fn test_workspace_overrides_global() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write(
        &test_dir.path().join("ecctool-verify").join("config.toml"),
        "[ecctool]\npath = \"/opt/global/ecctool\"\n\n[poll]\ntimeout_secs = 30\n",
    );
    write(
        &workspace.join("config").join("config.toml"),
        "[ecctool]\npath = \"/opt/workspace/ecctool\"\n",
    );

    let config = with_xdg_env(&test_dir, || ConfigLoader::load(&workspace)).unwrap();
    assert_eq!(config.ecctool.path, PathBuf::from("/opt/workspace/ecctool"));
    assert_eq!(config.poll.timeout_secs, 30);
}

#[test]
fn test_env_specific_workspace_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        "[output]\npartition = \"markers\"\n",
    );
    write(
        &workspace.join("config").join("ci.toml"),
        "[output]\npartition = \"fixed\"\n",
    );

    let config = with_xdg_env(&test_dir, || {
        std::env::set_var("ECCTOOL_VERIFY_ENV", "ci");
        ConfigLoader::load(&workspace)
    })
    .unwrap();
    assert_eq!(config.output.partition, Partition::Fixed);
}

#[test]
fn test_invalid_workspace_config_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        "[poll]\ninterval_ms = 0\n",
    );

    let err = with_xdg_env(&test_dir, || ConfigLoader::load(&workspace)).unwrap_err();
    assert!(err.to_string().contains("poll.interval_ms must be greater than zero"));
}

#[test]
fn test_explicit_file_skips_discovery() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    write(
        &workspace.join("config").join("config.toml"),
        "[ecctool]\npath = \"/opt/workspace/ecctool\"\n",
    );
    let explicit = test_dir.path().join("explicit.toml");
    write(&explicit, "[ecctool]\nsubcommand = \"status\"\n");

    let config = with_xdg_env(&test_dir, || ConfigLoader::load_from_file(&explicit)).unwrap();
    assert_eq!(config.ecctool.path, PathBuf::from("ecctool"));
    assert_eq!(config.ecctool.subcommand, "status");
}
