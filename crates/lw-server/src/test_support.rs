// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for `lw-server`'s own test modules: an `AppState`
//! wired against the bundled `flows/` directory and a scratch session
//! store, with an empty LLM route table (every `LLMChat` call fails fast
//! with `Protocol`, logged by the node rather than reaching the network).

use std::path::PathBuf;

use crate::config::{QueueMode, ServerConfig};
use crate::state::{build_state, AppState};

/// Path to the repo's bundled `flows/` directory, resolved relative to
/// this crate's manifest so tests don't depend on the test runner's cwd.
fn bundled_flow_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../flows"))
}

pub fn test_config(store_root: PathBuf) -> ServerConfig {
    ServerConfig {
        session_store_root: store_root,
        flow_dirs: vec![bundled_flow_dir()],
        queue_mode: QueueMode::Null,
        ..ServerConfig::default()
    }
}

/// Builds an `AppState` rooted at a fresh temp directory for session
/// storage, with the bundled flows loaded. Call from within a
/// `#[tokio::test]` (needs a runtime handle to register with `NodeContext`).
pub fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().to_path_buf());
    let state = build_state(config, tokio::runtime::Handle::current()).unwrap();
    (state, dir)
}

pub fn test_state_with(configure: impl FnOnce(&mut ServerConfig)) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path().to_path_buf());
    configure(&mut config);
    let state = build_state(config, tokio::runtime::Handle::current()).unwrap();
    (state, dir)
}
