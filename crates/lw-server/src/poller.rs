// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Outbox Poller: a single-threaded periodic loop that drains
//! undelivered jobs. Under `QueueMode::Null` it runs the Job Worker
//! inline, serializing jobs by session id; under `QueueMode::Distributed`
//! it hands each job to the configured `Queue` and lets external workers
//! drain it.

use std::time::Duration;

use lw_adapters::QueuedJob;
use lw_core::value::Value;
use lw_core::JobStatus;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::QueueMode;
use crate::error::ApiError;
use crate::job;
use crate::state::AppState;

/// Runs a single poll tick: lists every session's undelivered jobs and
/// either executes them inline or hands them to the queue. Returns the
/// number of jobs processed (enqueued or run).
pub async fn run_once(state: &AppState) -> Result<usize, ApiError> {
    let mut processed = 0;

    for session_id in state.store.list_sessions()? {
        let jobs = match state.store.list_undelivered(&session_id) {
            Ok(jobs) => jobs,
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "poller: failed to list undelivered jobs");
                continue;
            }
        };

        for job in jobs {
            if job.status != JobStatus::Pending {
                continue;
            }
            if !job::is_due(
                &job,
                state.config.job_retry_base_ms,
                state.config.job_retry_factor,
                state.clock.now_ms(),
            ) {
                continue;
            }

            match state.config.queue_mode {
                QueueMode::Null => {
                    state.store.mark_job_enqueued(&session_id, &job.id)?;
                    if let Err(err) = job::execute(state, job.clone()).await {
                        debug!(job_id = %job.id, error = ?err, "poller: inline job execution failed");
                    }
                }
                QueueMode::Distributed => {
                    let queued = QueuedJob {
                        job_id: job.id.as_str().to_string(),
                        session_id: session_id.as_str().to_string(),
                        kind: job.kind.as_str().to_string(),
                        payload: Value::Map(job.input_payload.0.clone()).to_json(),
                    };
                    if let Err(err) = state.queue.enqueue(queued).await {
                        error!(job_id = %job.id, error = %err, "poller: failed to enqueue job, will retry next tick");
                        continue;
                    }
                    state.store.mark_job_enqueued(&session_id, &job.id)?;
                }
            }

            processed += 1;
        }
    }

    Ok(processed)
}

/// Spawns the poller as a background task on `state.rt`, ticking every
/// `config.outbox_poll_ms`. The interval is created once outside the
/// loop: `tokio::select!`/`interval.tick()` inside a loop body would
/// otherwise reset the period on every iteration.
pub fn spawn(state: AppState) -> JoinHandle<()> {
    let period = Duration::from_millis(state.config.outbox_poll_ms.max(1));
    state.rt.clone().spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(err) = run_once(&state).await {
                error!(error = ?err, "poller: tick failed");
            }
        }
    })
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
