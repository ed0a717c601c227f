// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Chat Pipeline: `start_session`/`send`/`round_status`/`reroll`/
//! `branch`, built directly from the state/store/executor primitives.
//! Kept free of axum types so it can be exercised directly in tests
//! without going through HTTP.

use lw_core::node_result::Metrics;
use lw_core::value::{Item, Items};
use lw_core::{BranchId, JobKind, RoundStatus, Session, SessionId};
use lw_engine::{Executor, NodeContext, StateManager};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// The bundled Subflow a round's blocking StatusUpdate job runs.
pub const STATUS_UPDATE_REF: &str = "status_update@1";
/// The bundled Subflow a round's non-blocking Guidance job runs.
pub const GUIDANCE_REF: &str = "guidance@1";

#[derive(Debug, Clone, Serialize)]
pub struct RoundStatusView {
    pub round_no: u64,
    pub status: &'static str,
    pub blockers: Vec<String>,
}

fn status_label(status: RoundStatus) -> &'static str {
    match status {
        RoundStatus::Open => "open",
        RoundStatus::Blocked => "blocked",
        RoundStatus::Completed => "completed",
        RoundStatus::Failed => "failed",
    }
}

/// The common shape `send` and `reroll` both return.
pub struct SendOutcome {
    pub round_no: u64,
    pub snapshot_id: String,
    pub llm_reply: Option<String>,
    pub items: Items,
    pub logs: Vec<String>,
    pub metrics: Metrics,
    pub state_snapshot: Item,
    pub round_status: RoundStatusView,
}

/// The branch's latest round, if it's currently blocked.
fn blocked_tip(session: &Session, branch_id: &BranchId) -> Option<(u64, Vec<String>)> {
    let tip = session
        .rounds
        .iter()
        .filter(|r| &r.branch_id == branch_id)
        .max_by_key(|r| r.round_no)?;
    if tip.is_blocked() {
        Some((
            tip.round_no,
            tip.blockers.iter().map(|b| b.as_str().to_string()).collect(),
        ))
    } else {
        None
    }
}

fn extract_llm_reply(items: &Items) -> Option<String> {
    items
        .first()
        .and_then(|item| item.get("llm_response").or_else(|| item.get("llm_reply")))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

pub struct StartSessionOutcome {
    pub session_id: String,
    pub branch_id: String,
    pub state_snapshot: Item,
}

/// `POST /api/chat/session/start`. `use_world_state` is accepted for
/// parity with `/api/flow/run` but has nothing to inherit from on a
/// brand new session; it only matters once a session already exists.
pub fn start_session(
    state: &AppState,
    initial_state: Option<Item>,
    use_world_state: bool,
) -> Result<StartSessionOutcome, ApiError> {
    let _ = use_world_state;
    let outcome = state.store.create_session(initial_state.unwrap_or_default())?;
    let state_snapshot = outcome
        .session
        .branch(&outcome.default_branch)
        .map(|b| b.lss.clone())
        .unwrap_or_default();
    Ok(StartSessionOutcome {
        session_id: outcome.session.id.as_str().to_string(),
        branch_id: outcome.default_branch.as_str().to_string(),
        state_snapshot,
    })
}

/// `POST /api/chat/send`: begins a new round, runs the flow, records the
/// follow-up status and guidance jobs, and returns the blocked round.
pub fn send(
    state: &AppState,
    session_id: String,
    branch_id: Option<String>,
    user_input: String,
    flow_ref: String,
    extras: Option<Item>,
) -> Result<SendOutcome, ApiError> {
    let session_id = SessionId::new(session_id);
    let session = state.store.load_session(&session_id)?;

    let branch_id = match branch_id {
        Some(raw) => {
            let branch_id = BranchId::new(raw);
            session
                .branch(&branch_id)
                .ok_or_else(|| ApiError::NotFound(format!("branch not found: {branch_id}")))?;
            branch_id
        }
        None => session.active_branch_id.clone(),
    };

    if let Some((round_no, blockers)) = blocked_tip(&session, &branch_id) {
        return Err(ApiError::RoundBlocked { round_no, blockers });
    }

    let initial_lss = session.branch(&branch_id).map(|b| b.lss.clone()).unwrap_or_default();
    let begin = state.store.begin_round(&session_id, &branch_id, user_input.clone())?;

    let mut input_item = extras.unwrap_or_default();
    input_item.set("user_input", user_input.clone());

    let state_manager = StateManager::from_lss(initial_lss);
    let ctx = NodeContext::new(
        session_id.clone(),
        branch_id.clone(),
        begin.round_no,
        state_manager.clone(),
        state.node_resources(),
    );

    let result = {
        let flows = state.flows.read();
        let executor = Executor::new(&state.registry, &flows);
        executor.run(&flow_ref, vec![input_item], &ctx)?
    };

    let llm_reply = extract_llm_reply(&result.items);

    state.store.save_round_llm_reply(
        &session_id,
        &branch_id,
        begin.round_no,
        llm_reply.clone(),
        result.items.clone(),
        result.metrics.clone(),
        result.logs.clone(),
    )?;

    let working_state = state_manager.get_working_state();
    state
        .store
        .apply_state_updates(&session_id, &branch_id, working_state.clone())?;

    let job_payload = Item::new()
        .with("round_no", begin.round_no as i64)
        .with("user_input", user_input)
        .with("llm_reply", llm_reply.clone().unwrap_or_default());

    let status_job = state.store.record_job(
        &session_id,
        &branch_id,
        begin.round_no,
        JobKind::StatusUpdate,
        true,
        STATUS_UPDATE_REF.to_string(),
        job_payload.clone(),
    )?;

    if state.config.guidance_enabled {
        state.store.record_job(
            &session_id,
            &branch_id,
            begin.round_no,
            JobKind::Guidance,
            false,
            GUIDANCE_REF.to_string(),
            job_payload,
        )?;
    }

    let round_status = RoundStatusView {
        round_no: begin.round_no,
        status: "blocked",
        blockers: vec![status_job.job.id.as_str().to_string()],
    };

    Ok(SendOutcome {
        round_no: begin.round_no,
        snapshot_id: begin.snapshot.id.as_str().to_string(),
        llm_reply,
        items: result.items,
        logs: result.logs,
        metrics: result.metrics,
        state_snapshot: working_state,
        round_status,
    })
}

/// `GET /api/chat/round/{session}/{branch}/{round}/status`.
pub fn round_status(
    state: &AppState,
    session_id: String,
    branch_id: String,
    round_no: u64,
) -> Result<RoundStatusView, ApiError> {
    let session_id = SessionId::new(session_id);
    let branch_id = BranchId::new(branch_id);
    let session = state.store.load_session(&session_id)?;
    let round = session
        .round(&branch_id, round_no)
        .ok_or_else(|| ApiError::NotFound(format!("round not found: branch {branch_id} round {round_no}")))?;
    Ok(RoundStatusView {
        round_no,
        status: status_label(round.status),
        blockers: round.blockers.iter().map(|b| b.as_str().to_string()).collect(),
    })
}

/// `POST /api/chat/round/reroll`: same `round_no`, no new job recorded,
/// executes from the round's anchor snapshot rather than the branch's
/// current LSS.
pub fn reroll(
    state: &AppState,
    session_id: String,
    branch_id: String,
    round_no: u64,
    flow_ref: String,
    extras: Option<Item>,
) -> Result<SendOutcome, ApiError> {
    let session_id = SessionId::new(session_id);
    let branch_id = BranchId::new(branch_id);
    let session = state.store.load_session(&session_id)?;
    let round = session
        .round(&branch_id, round_no)
        .ok_or_else(|| ApiError::NotFound(format!("round not found: branch {branch_id} round {round_no}")))?
        .clone();
    let snapshot = session
        .snapshot(&round.anchor_snapshot_id)
        .ok_or_else(|| ApiError::NotFound(format!("snapshot not found: {}", round.anchor_snapshot_id)))?
        .clone();

    let mut input_item = extras.unwrap_or_default();
    input_item.set("user_input", round.user_input.clone());

    let state_manager = StateManager::from_lss(snapshot.lss_copy.clone());
    let ctx = NodeContext::new(
        session_id.clone(),
        branch_id.clone(),
        round_no,
        state_manager.clone(),
        state.node_resources(),
    );

    let result = {
        let flows = state.flows.read();
        let executor = Executor::new(&state.registry, &flows);
        executor.run(&flow_ref, vec![input_item], &ctx)?
    };

    let llm_reply = extract_llm_reply(&result.items);

    state.store.save_round_llm_reply(
        &session_id,
        &branch_id,
        round_no,
        llm_reply.clone(),
        result.items.clone(),
        result.metrics.clone(),
        result.logs.clone(),
    )?;

    let working_state = state_manager.get_working_state();
    state
        .store
        .apply_state_updates(&session_id, &branch_id, working_state.clone())?;

    let status = round_status(
        state,
        session_id.as_str().to_string(),
        branch_id.as_str().to_string(),
        round_no,
    )?;

    Ok(SendOutcome {
        round_no,
        snapshot_id: snapshot.id.as_str().to_string(),
        llm_reply,
        items: result.items,
        logs: result.logs,
        metrics: result.metrics,
        state_snapshot: working_state,
        round_status: status,
    })
}

/// `POST /api/chat/branch`. The new branch's initial LSS is the snapshot
/// anchoring `from_round` on the parent branch (or the parent's current
/// LSS if `from_round` is omitted) — `create_branch` already implements
/// this.
pub fn branch(
    state: &AppState,
    session_id: String,
    from_round: Option<u64>,
    parent_branch_id: Option<String>,
    set_active: bool,
) -> Result<String, ApiError> {
    let session_id = SessionId::new(session_id);
    let session = state.store.load_session(&session_id)?;
    let parent_branch_id = match parent_branch_id {
        Some(raw) => BranchId::new(raw),
        None => session.active_branch_id.clone(),
    };
    let new_branch_id = state
        .store
        .create_branch(&session_id, parent_branch_id, from_round, set_active)?;
    Ok(new_branch_id.as_str().to_string())
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
