// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SessionStore`: the sole owner of a session's durable document. Every
//! operation loads the current document, mutates it in memory, and
//! writes it back atomically, all under a per-session lock. There is no
//! write-ahead log; atomic replace is the whole durability story here.

use crate::doc::{read_document, session_path, write_document};
use crate::error::StoreError;
use lw_core::{
    BranchId, Clock, IdGen, Job, JobKind, JobStatus, OutboxEntry, Round, RoundStatus, Session,
    SessionBranch, SessionId, Snapshot, SnapshotId, SystemClock, UuidIdGen,
};
use lw_core::node_result::Metrics;
use lw_core::value::{Item, Items};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub struct CreateSessionOutcome {
    pub session: Session,
    pub default_branch: BranchId,
}

pub struct BeginRoundOutcome {
    pub round_no: u64,
    pub snapshot: Snapshot,
}

pub struct RecordJobOutcome {
    pub job: Job,
    /// `false` when an existing job already matched this idempotency key
    /// and no new job/outbox entry was inserted.
    pub is_new: bool,
}

/// Whether a round's blocker transitioning to failure propagates to the
/// round itself. Defaults to `true`.
#[derive(Debug, Clone, Copy)]
pub struct StorePolicy {
    pub fail_round_on_blocker_failure: bool,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            fail_round_on_blocker_failure: true,
        }
    }
}

pub struct SessionStore<C = SystemClock, G = UuidIdGen> {
    root: PathBuf,
    clock: C,
    id_gen: G,
    policy: StorePolicy,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionStore<SystemClock, UuidIdGen> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_clock_and_id_gen(root, SystemClock, UuidIdGen)
    }
}

impl<C: Clock, G: IdGen> SessionStore<C, G> {
    pub fn with_clock_and_id_gen(root: impl Into<PathBuf>, clock: C, id_gen: G) -> Self {
        Self {
            root: root.into(),
            clock,
            id_gen,
            policy: StorePolicy::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: StorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn load(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        read_document(&session_path(&self.root, session_id.as_str()))?
            .ok_or_else(|| StoreError::SessionNotFound(session_id.as_str().to_string()))
    }

    fn save(&self, session: &mut Session) -> Result<(), StoreError> {
        session.updated_at = self.clock.now_ms();
        write_document(&session_path(&self.root, session.id.as_str()), session)
    }

    /// Loads `session_id`, runs `f` against it, persists the result, and
    /// returns whatever `f` returned — the read-modify-write unit every
    /// other method is built from.
    fn with_session<T>(
        &self,
        session_id: &SessionId,
        f: impl FnOnce(&mut Session) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let guard = self.lock_for(session_id.as_str());
        let _held = guard.lock();
        let mut session = self.load(session_id)?;
        let result = f(&mut session)?;
        self.save(&mut session)?;
        Ok(result)
    }

    pub fn create_session(&self, initial_state: Item) -> Result<CreateSessionOutcome, StoreError> {
        let session_id = SessionId::new(self.id_gen.next());
        let branch_id = BranchId::new(self.id_gen.next());
        let guard = self.lock_for(session_id.as_str());
        let _held = guard.lock();
        let mut session = Session::new(session_id, branch_id.clone(), initial_state, self.clock.now_ms());
        self.save(&mut session)?;
        Ok(CreateSessionOutcome {
            session,
            default_branch: branch_id,
        })
    }

    pub fn load_session(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        self.load(session_id)
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let mut ids = Vec::new();
        if !self.root.exists() {
            return Ok(ids);
        }
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path().join("session.json");
            if path.exists() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(SessionId::new(name));
                }
            }
        }
        Ok(ids)
    }

    pub fn set_active_branch(&self, session_id: &SessionId, branch_id: BranchId) -> Result<(), StoreError> {
        self.with_session(session_id, |session| {
            if session.branch(&branch_id).is_none() {
                return Err(StoreError::BranchNotFound(branch_id.as_str().to_string()));
            }
            session.active_branch_id = branch_id;
            Ok(())
        })
    }

    /// New branch starts from the LSS of `parent_branch_id` at
    /// `from_round` (the snapshot anchoring that round) if given,
    /// otherwise from the parent branch's current LSS.
    pub fn create_branch(
        &self,
        session_id: &SessionId,
        parent_branch_id: BranchId,
        from_round: Option<u64>,
        set_active: bool,
    ) -> Result<BranchId, StoreError> {
        self.with_session(session_id, |session| {
            let initial_lss = match from_round {
                Some(round_no) => {
                    let round = session
                        .round(&parent_branch_id, round_no)
                        .ok_or_else(|| StoreError::RoundNotFound(parent_branch_id.as_str().to_string(), round_no))?;
                    let snapshot_id = round.anchor_snapshot_id.clone();
                    session
                        .snapshot(&snapshot_id)
                        .ok_or_else(|| StoreError::SnapshotNotFound(snapshot_id.as_str().to_string()))?
                        .lss_copy
                        .clone()
                }
                None => {
                    session
                        .branch(&parent_branch_id)
                        .ok_or_else(|| StoreError::BranchNotFound(parent_branch_id.as_str().to_string()))?
                        .lss
                        .clone()
                }
            };

            let branch_id = BranchId::new(self.id_gen.next());
            session.branches.push(SessionBranch {
                id: branch_id.clone(),
                parent_branch_id: Some(parent_branch_id.clone()),
                parent_round_no: from_round,
                created_at: self.clock.now_ms(),
                lss: initial_lss,
            });
            if set_active {
                session.active_branch_id = branch_id.clone();
            }
            Ok(branch_id)
        })
    }

    pub fn begin_round(
        &self,
        session_id: &SessionId,
        branch_id: &BranchId,
        user_input: String,
    ) -> Result<BeginRoundOutcome, StoreError> {
        self.with_session(session_id, |session| {
            let branch = session
                .branch(branch_id)
                .ok_or_else(|| StoreError::BranchNotFound(branch_id.as_str().to_string()))?;
            let lss_copy = branch.lss.clone();
            let round_no = session.next_round_no(branch_id);

            let snapshot = Snapshot {
                id: SnapshotId::new(self.id_gen.next()),
                branch_id: branch_id.clone(),
                taken_at_round_no: round_no,
                lss_copy,
                range: (0, round_no),
            };
            session.snapshots.push(snapshot.clone());
            session
                .rounds
                .push(Round::new(branch_id.clone(), round_no, snapshot.id.clone(), user_input));

            Ok(BeginRoundOutcome { round_no, snapshot })
        })
    }

    pub fn save_round_llm_reply(
        &self,
        session_id: &SessionId,
        branch_id: &BranchId,
        round_no: u64,
        reply: Option<String>,
        items: Items,
        metrics: Metrics,
        logs: Vec<String>,
    ) -> Result<(), StoreError> {
        self.with_session(session_id, |session| {
            let round = session
                .round_mut(branch_id, round_no)
                .ok_or_else(|| StoreError::RoundNotFound(branch_id.as_str().to_string(), round_no))?;
            round.llm_reply = reply;
            round.items = Some(items);
            round.metrics = Some(metrics);
            round.logs = logs;
            Ok(())
        })
    }

    /// Writes `updates` into the round's branch LSS — the path async job
    /// completion and main-IR `WriteState`/`IncrementCounter` results use
    /// to make a round's state durable.
    pub fn apply_state_updates(
        &self,
        session_id: &SessionId,
        branch_id: &BranchId,
        updates: Item,
    ) -> Result<(), StoreError> {
        self.with_session(session_id, |session| {
            let branch = session
                .branch_mut(branch_id)
                .ok_or_else(|| StoreError::BranchNotFound(branch_id.as_str().to_string()))?;
            for (k, v) in updates.0 {
                branch.lss.0.insert(k, v);
            }
            Ok(())
        })
    }

    fn idempotency_key(branch_id: &BranchId, round_no: u64, kind: &JobKind, subflow_ref: &str) -> String {
        format!("{}:{round_no}:{}:{subflow_ref}", branch_id.as_str(), kind.as_str())
    }

    pub fn record_job(
        &self,
        session_id: &SessionId,
        branch_id: &BranchId,
        round_no: u64,
        kind: JobKind,
        blocking: bool,
        subflow_ref: String,
        payload: Item,
    ) -> Result<RecordJobOutcome, StoreError> {
        self.with_session(session_id, |session| {
            let key = Self::idempotency_key(branch_id, round_no, &kind, &subflow_ref);
            if let Some(existing) = session.jobs.iter().find(|j| j.idempotency_key == key) {
                return Ok(RecordJobOutcome {
                    job: existing.clone(),
                    is_new: false,
                });
            }

            let now = self.clock.now_ms();
            let job = Job {
                id: lw_core::JobId::new(self.id_gen.next()),
                kind,
                blocking,
                session_id: session_id.clone(),
                branch_id: branch_id.clone(),
                round_no,
                subflow_ref,
                input_payload: payload,
                idempotency_key: key,
                status: JobStatus::Pending,
                attempts: 0,
                last_error: None,
                created_at: now,
                updated_at: now,
                heartbeat_at: None,
            };
            session.jobs.push(job.clone());
            session.outbox.push(OutboxEntry {
                job_id: job.id.clone(),
                enqueued_at: None,
                delivered: false,
            });

            if blocking {
                let round = session
                    .round_mut(branch_id, round_no)
                    .ok_or_else(|| StoreError::RoundNotFound(branch_id.as_str().to_string(), round_no))?;
                round.blockers.insert(job.id.clone());
                round.status = RoundStatus::Blocked;
            }

            Ok(RecordJobOutcome { job, is_new: true })
        })
    }

    pub fn mark_job_enqueued(&self, session_id: &SessionId, job_id: &lw_core::JobId) -> Result<(), StoreError> {
        self.with_session(session_id, |session| {
            let now = self.clock.now_ms();
            if let Some(entry) = session.outbox.iter_mut().find(|e| &e.job_id == job_id) {
                entry.enqueued_at = Some(now);
                entry.delivered = true;
            }
            let job = session
                .job_mut(job_id)
                .ok_or_else(|| StoreError::JobNotFound(job_id.as_str().to_string()))?;
            job.status = JobStatus::Enqueued;
            job.heartbeat_at = Some(now);
            job.updated_at = now;
            Ok(())
        })
    }

    pub fn update_job_status(
        &self,
        session_id: &SessionId,
        job_id: &lw_core::JobId,
        status: JobStatus,
        last_error: Option<String>,
        state_updates: Option<Item>,
    ) -> Result<(), StoreError> {
        self.with_session(session_id, |session| {
            let now = self.clock.now_ms();
            let (branch_id, round_no, blocking) = {
                let job_mut = session
                    .job_mut(job_id)
                    .ok_or_else(|| StoreError::JobNotFound(job_id.as_str().to_string()))?;
                job_mut.status = status;
                job_mut.last_error = last_error;
                job_mut.updated_at = now;
                job_mut.heartbeat_at = Some(now);
                if status != JobStatus::Completed && status != JobStatus::Failed {
                    job_mut.attempts += 1;
                }
                (job_mut.branch_id.clone(), job_mut.round_no, job_mut.blocking)
            };

            if let Some(updates) = state_updates {
                let branch = session
                    .branch_mut(&branch_id)
                    .ok_or_else(|| StoreError::BranchNotFound(branch_id.as_str().to_string()))?;
                for (k, v) in updates.0 {
                    branch.lss.0.insert(k, v);
                }
            }

            if blocking {
                match status {
                    JobStatus::Completed => {
                        if let Some(round) = session.round_mut(&branch_id, round_no) {
                            round.blockers.remove(job_id);
                            if round.blockers.is_empty() && round.status == RoundStatus::Blocked {
                                round.status = RoundStatus::Completed;
                            }
                        }
                    }
                    JobStatus::Failed if self.policy.fail_round_on_blocker_failure => {
                        if let Some(round) = session.round_mut(&branch_id, round_no) {
                            round.status = RoundStatus::Failed;
                        }
                    }
                    _ => {}
                }
            }

            Ok(())
        })
    }

    pub fn list_pending_jobs(&self, session_id: &SessionId) -> Result<Vec<Job>, StoreError> {
        let session = self.load(session_id)?;
        Ok(session.jobs.into_iter().filter(|j| j.status == JobStatus::Pending).collect())
    }

    pub fn get_job(&self, session_id: &SessionId, job_id: &lw_core::JobId) -> Result<Job, StoreError> {
        let session = self.load(session_id)?;
        session
            .job(job_id)
            .cloned()
            .ok_or_else(|| StoreError::JobNotFound(job_id.as_str().to_string()))
    }

    /// Outbox entries not yet delivered, paired with their job — what the
    /// Outbox Poller drains on each tick.
    pub fn list_undelivered(&self, session_id: &SessionId) -> Result<Vec<Job>, StoreError> {
        let session = self.load(session_id)?;
        Ok(session
            .outbox
            .iter()
            .filter(|e| !e.delivered)
            .filter_map(|e| session.job(&e.job_id).cloned())
            .collect())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
