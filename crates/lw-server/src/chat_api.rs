// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/chat/*`: the HTTP surface over the Chat Pipeline (`chat.rs`).
//! Handlers are thin: parse the request, call the pure pipeline
//! function, shape the response. Mirrors `flow_api.rs`'s division of
//! labor between transport and logic.

use axum::extract::{Path, State};
use axum::Json;
use lw_core::node_result::Metrics;
use lw_core::value::{Item, Items};
use serde::{Deserialize, Serialize};

use crate::chat::{self, RoundStatusView, SendOutcome};
use crate::error::ApiError;
use crate::state::AppState;

/// Default bundled flow a `send`/`reroll` runs when the request omits `ref`.
const DEFAULT_FLOW_REF: &str = "main@1";

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub use_world_state: bool,
    pub initial_state: Option<Item>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub branch_id: String,
    pub state_snapshot: Item,
}

/// `POST /api/chat/session/start`.
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let outcome = chat::start_session(&state, req.initial_state, req.use_world_state)?;
    Ok(Json(StartSessionResponse {
        session_id: outcome.session_id,
        branch_id: outcome.branch_id,
        state_snapshot: outcome.state_snapshot,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub session_id: String,
    pub branch_id: Option<String>,
    pub user_input: String,
    #[serde(rename = "ref", default = "default_flow_ref")]
    pub flow_ref: String,
    pub extras: Option<Item>,
}

fn default_flow_ref() -> String {
    DEFAULT_FLOW_REF.to_string()
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub round_no: u64,
    pub snapshot_id: String,
    pub llm_reply: Option<String>,
    pub items: Items,
    pub logs: Vec<String>,
    pub metrics: Metrics,
    pub state_snapshot: Item,
    pub round_status: RoundStatusView,
}

impl From<SendOutcome> for SendResponse {
    fn from(outcome: SendOutcome) -> Self {
        Self {
            round_no: outcome.round_no,
            snapshot_id: outcome.snapshot_id,
            llm_reply: outcome.llm_reply,
            items: outcome.items,
            logs: outcome.logs,
            metrics: outcome.metrics,
            state_snapshot: outcome.state_snapshot,
            round_status: outcome.round_status,
        }
    }
}

/// `POST /api/chat/send`. Returns 409 `round_blocked` (via `ApiError`)
/// when the branch's latest round still has unfinished blocking jobs.
pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let outcome = chat::send(
        &state,
        req.session_id,
        req.branch_id,
        req.user_input,
        req.flow_ref,
        req.extras,
    )?;
    Ok(Json(outcome.into()))
}

/// `GET /api/chat/round/{session_id}/{branch_id}/{round_no}/status`.
pub async fn round_status(
    State(state): State<AppState>,
    Path((session_id, branch_id, round_no)): Path<(String, String, u64)>,
) -> Result<Json<RoundStatusView>, ApiError> {
    let status = chat::round_status(&state, session_id, branch_id, round_no)?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
pub struct RerollRequest {
    pub session_id: String,
    pub branch_id: String,
    pub round_no: u64,
    #[serde(rename = "ref", default = "default_flow_ref")]
    pub flow_ref: String,
    pub extras: Option<Item>,
}

/// `POST /api/chat/round/reroll`. Same `round_no`, re-executed from the
/// round's anchor snapshot; never records a new job.
pub async fn reroll(
    State(state): State<AppState>,
    Json(req): Json<RerollRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let outcome = chat::reroll(
        &state,
        req.session_id,
        req.branch_id,
        req.round_no,
        req.flow_ref,
        req.extras,
    )?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct BranchRequest {
    pub session_id: String,
    pub from_round: Option<u64>,
    pub parent_branch_id: Option<String>,
    #[serde(default)]
    pub set_active: bool,
}

#[derive(Debug, Serialize)]
pub struct BranchResponse {
    pub branch_id: String,
}

/// `POST /api/chat/branch`.
pub async fn branch(
    State(state): State<AppState>,
    Json(req): Json<BranchRequest>,
) -> Result<Json<BranchResponse>, ApiError> {
    let branch_id = chat::branch(&state, req.session_id, req.from_round, req.parent_branch_id, req.set_active)?;
    Ok(Json(BranchResponse { branch_id }))
}

#[cfg(test)]
#[path = "chat_api_tests.rs"]
mod tests;
