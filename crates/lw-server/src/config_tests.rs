// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::load(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.queue_mode, QueueMode::Null);
    assert!(config.guidance_enabled);
}

#[test]
fn load_parses_a_partial_toml_file_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loomwork.toml");
    std::fs::write(&path, "bind_addr = \"0.0.0.0:9090\"\nqueue_mode = \"distributed\"\n").unwrap();

    let config = ServerConfig::load(&path).unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:9090");
    assert_eq!(config.queue_mode, QueueMode::Distributed);
    // Untouched fields keep their defaults.
    assert_eq!(config.outbox_poll_ms, 250);
}

#[test]
fn cli_flags_override_file_config() {
    let config = ServerConfig::default();
    let cli = CliArgs {
        config: PathBuf::from("loomwork.toml"),
        bind_addr: Some("0.0.0.0:1234".to_string()),
        session_store_root: None,
        flow_dir: vec![],
        queue_mode: Some(QueueMode::Distributed),
    };
    let merged = config.apply_cli(&cli);
    assert_eq!(merged.bind_addr, "0.0.0.0:1234");
    assert_eq!(merged.queue_mode, QueueMode::Distributed);
    // Not overridden: stays at the file/default value.
    assert_eq!(merged.session_store_root, PathBuf::from("./data/sessions"));
}

#[test]
fn cli_flow_dir_replaces_the_whole_list_when_present() {
    let config = ServerConfig::default();
    let cli = CliArgs {
        config: PathBuf::from("loomwork.toml"),
        bind_addr: None,
        session_store_root: None,
        flow_dir: vec![PathBuf::from("/a"), PathBuf::from("/b")],
        queue_mode: None,
    };
    let merged = config.apply_cli(&cli);
    assert_eq!(merged.flow_dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
}

#[test]
fn default_guidance_retention_policy_is_retain_if_anchor_unchanged() {
    assert_eq!(
        GuidanceRetentionPolicy::default(),
        GuidanceRetentionPolicy::RetainIfAnchorUnchanged
    );
}
