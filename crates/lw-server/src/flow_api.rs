// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/flow/*`: ad-hoc flow execution, schema validation, and a
//! registry/index reload — the stateless surface that doesn't touch the
//! session tree.

use axum::extract::State;
use axum::Json;
use lw_core::node_result::Metrics;
use lw_core::value::{Item, Items};
use lw_core::{BranchId, SessionId};
use lw_engine::{Executor, NodeContext, StateManager};
use lw_ir::doc::IrDocument;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FlowRunRequest {
    #[serde(rename = "ref")]
    pub flow_ref: String,
    #[serde(default)]
    pub items: Items,
    pub session_id: Option<String>,
    #[serde(default)]
    pub use_world_state: bool,
    pub initial_state: Option<Item>,
    /// Accepted for forward compatibility with a future per-request
    /// resource override; unused by the MVP executor wiring.
    #[allow(dead_code)]
    pub resources: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct FlowRunResponse {
    pub items: Items,
    pub logs: Vec<String>,
    pub metrics: Metrics,
    pub state_snapshot: Item,
}

/// `POST /api/flow/run`. When `session_id` is given, the run starts from
/// that session's active branch LSS (`use_world_state` is then implied);
/// otherwise it starts from `initial_state` (or an empty item).
pub async fn run_flow(
    State(state): State<AppState>,
    Json(req): Json<FlowRunRequest>,
) -> Result<Json<FlowRunResponse>, ApiError> {
    let (session_id, branch_id, initial_lss) = if let Some(sid) = &req.session_id {
        let session_id = SessionId::new(sid.clone());
        let session = state.store.load_session(&session_id)?;
        let branch_id = session.active_branch_id.clone();
        let lss = session
            .branch(&branch_id)
            .ok_or_else(|| ApiError::NotFound(format!("branch not found: {branch_id}")))?
            .lss
            .clone();
        (session_id, branch_id, lss)
    } else {
        (
            SessionId::new("adhoc"),
            BranchId::new("adhoc"),
            req.initial_state.clone().unwrap_or_default(),
        )
    };

    let state_manager = StateManager::from_lss(initial_lss);
    let resources = state.node_resources();
    let ctx = NodeContext::new(session_id, branch_id, 0, state_manager.clone(), resources);

    let flows = state.flows.read();
    let executor = Executor::new(&state.registry, &flows);
    let result = executor.run(&req.flow_ref, req.items, &ctx)?;

    Ok(Json(FlowRunResponse {
        items: result.items,
        logs: result.logs,
        metrics: result.metrics,
        state_snapshot: state_manager.get_for_prompt(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub doc: IrDocument,
}

/// `POST /api/flow/validate`. Schema + referential check only — returns
/// `{valid: false, error: "entry not found"}` for a document whose
/// entry id doesn't exist.
pub async fn validate_flow(Json(req): Json<ValidateRequest>) -> Json<serde_json::Value> {
    let outcome: lw_engine::ValidateOutcome = lw_ir::validate_document(&req.doc).into();
    Json(crate::error::validation_body(outcome))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReloadRequest {
    pub dirs: Option<Vec<PathBuf>>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub flows: Vec<String>,
    pub node_types: Vec<String>,
}

/// `POST /api/flow/reload`. Swaps the flow index and (unconditionally)
/// rebuilds the node registry atomically, per §5's shared-resource
/// policy.
pub async fn reload_flows(
    State(state): State<AppState>,
    Json(req): Json<ReloadRequest>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let dirs = req.dirs.unwrap_or_else(|| state.config.flow_dirs.clone());
    let loaded = {
        let mut flows = state.flows.write();
        flows.reload(&dirs)?
    };
    state.registry.reload()?;

    Ok(Json(ReloadResponse {
        flows: loaded,
        node_types: state.registry.type_names(),
    }))
}

#[cfg(test)]
#[path = "flow_api_tests.rs"]
mod tests;
