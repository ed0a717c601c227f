// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup crash recovery: scan every session document and revert jobs
//! stuck in `enqueued`/`running` with a stale heartbeat back to
//! `pending` so the Outbox Poller redelivers them. Idempotency keys make
//! redelivery safe.

use crate::doc::{read_document, write_document};
use crate::error::StoreError;
use lw_core::JobStatus;
use std::path::Path;

/// Walks `<root>/*/session.json`, reverting stale in-flight jobs to
/// `pending`. Returns the number of jobs reverted.
pub fn recover_stale_jobs(root: &Path, now_ms: u64, stale_after_ms: u64) -> Result<usize, StoreError> {
    if !root.exists() {
        return Ok(0);
    }

    let mut reverted = 0;
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path().join("session.json");
        let Some(mut session) = read_document(&path)? else {
            continue;
        };

        let mut changed = false;
        for job in &mut session.jobs {
            let in_flight = matches!(job.status, JobStatus::Enqueued | JobStatus::Running);
            let stale = job
                .heartbeat_at
                .map(|hb| now_ms.saturating_sub(hb) > stale_after_ms)
                .unwrap_or(true);
            if in_flight && stale {
                job.status = JobStatus::Pending;
                job.heartbeat_at = None;
                job.updated_at = now_ms;
                changed = true;
                reverted += 1;
            }
        }

        if changed {
            write_document(&path, &session)?;
        }
    }

    Ok(reverted)
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
