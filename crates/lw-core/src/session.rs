// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session tree: the persisted shape of one interactive-fiction
//! conversation — branches, rounds, snapshots, jobs, and the outbox that
//! schedules them. Pure data; the read/write operations over it live in
//! `lw-storage` and the mutation rules (round gating, idempotency) in
//! `lw-engine`/`lw-server`.

use crate::id::{BranchId, JobId, SessionId, SnapshotId};
use crate::node_result::Metrics;
use crate::value::{Item, Items};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One interactive-fiction conversation: a tree of branches and rounds,
/// the snapshots anchoring them, the jobs scheduled against them, and the
/// current last-stable-state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub created_at: u64,
    /// Bumped on every mutating store operation; used by the debug console
    /// and stale-lock diagnostics.
    pub updated_at: u64,
    pub active_branch_id: BranchId,
    pub branches: Vec<SessionBranch>,
    pub rounds: Vec<Round>,
    pub snapshots: Vec<Snapshot>,
    pub jobs: Vec<Job>,
    pub outbox: Vec<OutboxEntry>,
}

impl Session {
    pub fn new(id: SessionId, default_branch: BranchId, initial_state: Item, now_ms: u64) -> Self {
        Self {
            id,
            created_at: now_ms,
            updated_at: now_ms,
            active_branch_id: default_branch.clone(),
            branches: vec![SessionBranch {
                id: default_branch,
                parent_branch_id: None,
                parent_round_no: None,
                created_at: now_ms,
                lss: initial_state,
            }],
            rounds: Vec::new(),
            snapshots: Vec::new(),
            jobs: Vec::new(),
            outbox: Vec::new(),
        }
    }

    pub fn branch(&self, id: &BranchId) -> Option<&SessionBranch> {
        self.branches.iter().find(|b| &b.id == id)
    }

    pub fn branch_mut(&mut self, id: &BranchId) -> Option<&mut SessionBranch> {
        self.branches.iter_mut().find(|b| &b.id == id)
    }

    pub fn round(&self, branch_id: &BranchId, round_no: u64) -> Option<&Round> {
        self.rounds
            .iter()
            .find(|r| &r.branch_id == branch_id && r.round_no == round_no)
    }

    pub fn round_mut(&mut self, branch_id: &BranchId, round_no: u64) -> Option<&mut Round> {
        self.rounds
            .iter_mut()
            .find(|r| &r.branch_id == branch_id && r.round_no == round_no)
    }

    pub fn job(&self, job_id: &JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| &j.id == job_id)
    }

    pub fn job_mut(&mut self, job_id: &JobId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| &j.id == job_id)
    }

    /// Next `round_no` for `branch_id`: a strictly increasing counter
    /// starting at 1 for a root branch, or continuing from the fork
    /// point for a branch created off another branch's round — a fresh
    /// branch has no rounds of its own yet, so its first round picks up
    /// right after `parent_round_no` rather than resetting to 1.
    pub fn next_round_no(&self, branch_id: &BranchId) -> u64 {
        let own_max = self
            .rounds
            .iter()
            .filter(|r| &r.branch_id == branch_id)
            .map(|r| r.round_no)
            .max();
        if let Some(max) = own_max {
            return max + 1;
        }
        let floor = self.branch(branch_id).and_then(|b| b.parent_round_no).unwrap_or(0);
        floor + 1
    }

    pub fn snapshot(&self, id: &SnapshotId) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| &s.id == id)
    }
}

/// A branch: append-only, optionally forked from a parent branch at a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBranch {
    pub id: BranchId,
    pub parent_branch_id: Option<BranchId>,
    pub parent_round_no: Option<u64>,
    pub created_at: u64,
    /// Last-stable-state: the durable half of the dual-state model, kept
    /// per branch so branches diverge independently.
    pub lss: Item,
}

/// Status of a single round in a branch's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Open,
    Blocked,
    Completed,
    Failed,
}

/// One player turn: the input, the reply, and the jobs gating its closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub branch_id: BranchId,
    pub round_no: u64,
    pub status: RoundStatus,
    /// Unfinished blocking job ids for this round. `status == Blocked` iff
    /// this set is non-empty.
    pub blockers: BTreeSet<JobId>,
    pub anchor_snapshot_id: SnapshotId,
    pub user_input: String,
    pub llm_reply: Option<String>,
    pub items: Option<Items>,
    pub metrics: Option<Metrics>,
    pub logs: Vec<String>,
}

impl Round {
    pub fn new(branch_id: BranchId, round_no: u64, anchor_snapshot_id: SnapshotId, user_input: String) -> Self {
        Self {
            branch_id,
            round_no,
            status: RoundStatus::Open,
            blockers: BTreeSet::new(),
            anchor_snapshot_id,
            user_input,
            llm_reply: None,
            items: None,
            metrics: None,
            logs: Vec::new(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty()
    }
}

/// An immutable point-in-time copy of a branch's LSS, anchoring a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub branch_id: BranchId,
    pub taken_at_round_no: u64,
    pub lss_copy: Item,
    /// `[0..turn_count]` at the time the snapshot was taken.
    pub range: (u64, u64),
}

/// The kind of asynchronous post-processing a job performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    StatusUpdate,
    Guidance,
    Summarize,
    Other(String),
}

impl JobKind {
    pub fn as_str(&self) -> &str {
        match self {
            JobKind::StatusUpdate => "status_update",
            JobKind::Guidance => "guidance",
            JobKind::Summarize => "summarize",
            JobKind::Other(s) => s,
        }
    }
}

/// Lifecycle status of a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Enqueued,
    Running,
    Completed,
    Failed,
}

/// A unit of asynchronous post-processing work scheduled against a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub blocking: bool,
    pub session_id: SessionId,
    pub branch_id: BranchId,
    pub round_no: u64,
    /// The subflow this job runs, as `id@version`.
    pub subflow_ref: String,
    pub input_payload: Item,
    pub idempotency_key: String,
    pub status: JobStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
    /// Last time a worker reported progress on this job. Jobs in
    /// `enqueued`/`running` with a stale heartbeat are reverted to
    /// `pending` by the store's crash recovery scan.
    pub heartbeat_at: Option<u64>,
}

/// An entry in a session's outbox: a job awaiting delivery to a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub job_id: JobId,
    pub enqueued_at: Option<u64>,
    pub delivered: bool,
}

/// The dual-state model backing a session's branch: Working vs.
/// Last-Stable-State, with a pending-key set for prompt-time fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateData {
    pub lss: Item,
    pub working: Item,
    pub pending: BTreeSet<String>,
}

impl StateData {
    pub fn from_lss(lss: Item) -> Self {
        Self {
            working: lss.clone(),
            lss,
            pending: BTreeSet::new(),
        }
    }

    /// `Working` with each `pending` key overridden by its `LSS` value;
    /// keys missing from both sides are simply absent.
    pub fn for_prompt(&self) -> Item {
        let mut view: IndexMap<String, crate::value::Value> = self.working.0.clone();
        for key in &self.pending {
            match self.lss.get(key) {
                Some(v) => {
                    view.insert(key.clone(), v.clone());
                }
                None => {
                    view.shift_remove(key);
                }
            }
        }
        Item(view)
    }

    /// Applies `updates` to both `Working` and `LSS` atomically; never
    /// touches `pending`.
    pub fn update_sync(&mut self, updates: Item) {
        for (k, v) in updates.0 {
            self.working.0.insert(k.clone(), v.clone());
            self.lss.0.insert(k, v);
        }
    }

    pub fn start_async_update(&mut self, keys: impl IntoIterator<Item = String>) {
        self.pending.extend(keys);
    }

    /// Writes `updates` to `LSS` and `Working` and clears their keys from
    /// `pending`.
    pub fn complete_async_update(&mut self, updates: Item) {
        for (k, v) in updates.0 {
            self.lss.0.insert(k.clone(), v.clone());
            self.working.0.insert(k.clone(), v);
            self.pending.remove(&k);
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
