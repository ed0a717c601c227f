// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job Worker: loads a job, runs its subflow against the
//! branch's current state, and writes the outcome back. Invoked by the
//! Outbox Poller, either inline (`Null` queue mode) or after a claim
//! from a `Distributed` queue.

use lw_core::{Job, JobStatus, Session};
use lw_engine::{Executor, NodeContext, StateManager};

use crate::config::GuidanceRetentionPolicy;
use crate::error::ApiError;
use crate::state::AppState;

/// Exponential backoff delay before a `Pending` job (already attempted at
/// least once) is due for redelivery: `base * factor^(attempts - 1)`.
pub fn backoff_delay_ms(base_ms: u64, factor: f64, attempts: u32) -> u64 {
    if attempts == 0 {
        return 0;
    }
    let delay = base_ms as f64 * factor.powi(attempts as i32 - 1);
    delay.round() as u64
}

/// Whether a job that has already been attempted is due for another try,
/// given its last `updated_at` heartbeat. Fresh (never-attempted) jobs
/// are always due.
pub fn is_due(job: &Job, base_ms: u64, factor: f64, now_ms: u64) -> bool {
    if job.attempts == 0 {
        return true;
    }
    let delay = backoff_delay_ms(base_ms, factor, job.attempts);
    now_ms.saturating_sub(job.updated_at) >= delay
}

/// Whether a non-blocking job's state updates should still land given
/// `policy`. Blocking jobs always apply: they gate the round's own
/// completion, so their output is never stale by definition. For
/// non-blocking jobs under `RetainIfAnchorUnchanged`, "unchanged" means
/// the round is still the branch's latest — `reroll` never rewrites a
/// round's anchor snapshot in place, so a later round (from a fresh send
/// or a branch) is the only way a round becomes superseded.
fn should_apply_updates(session: &Session, job: &Job, policy: GuidanceRetentionPolicy) -> bool {
    if job.blocking {
        return true;
    }
    match policy {
        GuidanceRetentionPolicy::AlwaysApply => true,
        GuidanceRetentionPolicy::AlwaysDiscard => false,
        GuidanceRetentionPolicy::RetainIfAnchorUnchanged => {
            session.next_round_no(&job.branch_id) == job.round_no + 1
        }
    }
}

/// Runs one job to completion (or failure), updating its status and, if
/// applicable, the branch's durable state. Never panics on handler
/// failure: engine/store errors are folded into the job's `last_error`
/// and a `Pending`/`Failed` transition per the retry cap, and only
/// surfaced to the caller as an `Err` for logging.
pub async fn execute(state: &AppState, job: Job) -> Result<(), ApiError> {
    state
        .store
        .update_job_status(&job.session_id, &job.id, JobStatus::Running, None, None)?;

    let session = state.store.load_session(&job.session_id)?;
    let initial_lss = session
        .branch(&job.branch_id)
        .ok_or_else(|| ApiError::NotFound(format!("branch not found: {}", job.branch_id)))?
        .lss
        .clone();

    let state_manager = StateManager::from_lss(initial_lss);
    let ctx = NodeContext::new(
        job.session_id.clone(),
        job.branch_id.clone(),
        job.round_no,
        state_manager.clone(),
        state.node_resources(),
    );

    let run_result = {
        let flows = state.flows.read();
        let executor = Executor::new(&state.registry, &flows);
        executor.run(&job.subflow_ref, vec![job.input_payload.clone()], &ctx)
    };

    match run_result {
        Ok(_) => {
            let session = state.store.load_session(&job.session_id)?;
            let updates = should_apply_updates(&session, &job, state.config.guidance_retention_policy)
                .then(|| state_manager.get_working_state());
            state
                .store
                .update_job_status(&job.session_id, &job.id, JobStatus::Completed, None, updates)?;
            Ok(())
        }
        Err(err) => {
            let message = err.to_string();
            let current = state.store.get_job(&job.session_id, &job.id)?;
            let next_status = if current.attempts >= state.config.job_retry_max_attempts {
                JobStatus::Failed
            } else {
                JobStatus::Pending
            };
            state
                .store
                .update_job_status(&job.session_id, &job.id, next_status, Some(message.clone()), None)?;
            Err(ApiError::Internal(message))
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
