// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::QueueMode;
use crate::test_support::test_config;

#[tokio::test(flavor = "multi_thread")]
async fn build_state_loads_the_bundled_flows_and_registers_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().to_path_buf());
    let state = build_state(config, tokio::runtime::Handle::current()).unwrap();

    assert!(state.flows.read().resolve("main@1").is_ok());
    assert!(state.registry.type_names().contains(&"Sequence".to_string()));
    assert!(state.registry.type_names().contains(&"LLMChat".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn build_state_wires_a_null_queue_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().to_path_buf());
    assert!(matches!(config.queue_mode, QueueMode::Null));
    let state = build_state(config, tokio::runtime::Handle::current()).unwrap();

    let job = lw_adapters::QueuedJob {
        job_id: "job-1".to_string(),
        session_id: "s1".to_string(),
        kind: "status_update".to_string(),
        payload: serde_json::json!({}),
    };
    state.queue.enqueue(job).await.unwrap();
    assert_eq!(
        state.queue.status("job-1").await.unwrap(),
        Some(lw_adapters::QueueStatus::Done)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn node_resources_fails_fast_with_no_route_configured_for_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path().to_path_buf());
    let state = build_state(config, tokio::runtime::Handle::current()).unwrap();

    let resources = state.node_resources();
    let err = resources.llm.chat("flagship", vec![], None).await.unwrap_err();
    assert_eq!(err.kind(), lw_adapters::LlmErrorKind::Protocol);
}
