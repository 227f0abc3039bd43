// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.monitor_interval(), Duration::from_secs(30));
    assert_eq!(config.smart_interval(), Duration::from_secs(1800));
    assert!(!config.disks.scan_loop_devices);
}

#[test]
fn partial_file_overrides_only_named_keys() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("keel.toml"),
        "[monitor]\ninterval_secs = 5\n\n[disks]\nscan_loop_devices = true\n",
    )
    .unwrap();

    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config.monitor_interval(), Duration::from_secs(5));
    assert_eq!(config.smart_interval(), Duration::from_secs(1800));
    assert!(config.disks.scan_loop_devices);
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("keel.toml"), "[monitor]\ninterval = 5\n").unwrap();
    assert!(matches!(Config::load(dir.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("keel.toml"), "not [ toml").unwrap();
    assert!(matches!(Config::load(dir.path()), Err(ConfigError::Parse(_))));
}
