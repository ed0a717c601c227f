// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lw_core::clock::FakeClock;
use lw_core::id::SequentialIdGen;
use lw_core::value::Value;

fn store(dir: &std::path::Path) -> SessionStore<FakeClock, SequentialIdGen> {
    SessionStore::with_clock_and_id_gen(dir, FakeClock::new(1_000), SequentialIdGen::new("id"))
}

#[test]
fn create_session_persists_a_loadable_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let outcome = store.create_session(Item::new().with("turn_count", 0i64)).unwrap();

    let loaded = store.load_session(&outcome.session.id).unwrap();
    assert_eq!(loaded.active_branch_id, outcome.default_branch);
    assert_eq!(loaded.branch(&outcome.default_branch).unwrap().lss.get("turn_count"), Some(&Value::Int(0)));
}

#[test]
fn list_sessions_finds_every_created_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let a = store.create_session(Item::new()).unwrap();
    let b = store.create_session(Item::new()).unwrap();

    let mut ids: Vec<String> = store.list_sessions().unwrap().into_iter().map(|id| id.as_str().to_string()).collect();
    ids.sort();
    let mut expected = vec![a.session.id.as_str().to_string(), b.session.id.as_str().to_string()];
    expected.sort();
    assert_eq!(ids, expected);
}

#[test]
fn begin_round_allocates_sequential_round_numbers_and_anchors_a_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let created = store.create_session(Item::new().with("turn_count", 0i64)).unwrap();
    let branch_id = created.default_branch;

    let first = store.begin_round(&created.session.id, &branch_id, "enter tavern".to_string()).unwrap();
    assert_eq!(first.round_no, 1);
    assert_eq!(first.snapshot.lss_copy.get("turn_count"), Some(&Value::Int(0)));

    let second = store.begin_round(&created.session.id, &branch_id, "look around".to_string()).unwrap();
    assert_eq!(second.round_no, 2);
}

#[test]
fn record_job_is_idempotent_on_matching_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let created = store.create_session(Item::new()).unwrap();
    let branch_id = created.default_branch;
    let round = store.begin_round(&created.session.id, &branch_id, "hi".to_string()).unwrap();

    let first = store
        .record_job(
            &created.session.id,
            &branch_id,
            round.round_no,
            JobKind::StatusUpdate,
            true,
            "status_update@1".to_string(),
            Item::new(),
        )
        .unwrap();
    assert!(first.is_new);

    let second = store
        .record_job(
            &created.session.id,
            &branch_id,
            round.round_no,
            JobKind::StatusUpdate,
            true,
            "status_update@1".to_string(),
            Item::new(),
        )
        .unwrap();
    assert!(!second.is_new);
    assert_eq!(first.job.id, second.job.id);

    let loaded = store.load_session(&created.session.id).unwrap();
    assert_eq!(loaded.jobs.len(), 1);
    assert_eq!(loaded.outbox.len(), 1);
}

#[test]
fn blocking_job_blocks_round_until_completed() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let created = store.create_session(Item::new()).unwrap();
    let branch_id = created.default_branch;
    let round = store.begin_round(&created.session.id, &branch_id, "hi".to_string()).unwrap();

    let job = store
        .record_job(
            &created.session.id,
            &branch_id,
            round.round_no,
            JobKind::StatusUpdate,
            true,
            "status_update@1".to_string(),
            Item::new(),
        )
        .unwrap()
        .job;

    let loaded = store.load_session(&created.session.id).unwrap();
    let r = loaded.round(&branch_id, round.round_no).unwrap();
    assert_eq!(r.status, RoundStatus::Blocked);
    assert!(r.blockers.contains(&job.id));

    store.mark_job_enqueued(&created.session.id, &job.id).unwrap();
    store
        .update_job_status(&created.session.id, &job.id, JobStatus::Completed, None, None)
        .unwrap();

    let loaded = store.load_session(&created.session.id).unwrap();
    let r = loaded.round(&branch_id, round.round_no).unwrap();
    assert_eq!(r.status, RoundStatus::Completed);
    assert!(r.blockers.is_empty());
}

#[test]
fn failed_blocking_job_fails_round_under_default_policy() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let created = store.create_session(Item::new()).unwrap();
    let branch_id = created.default_branch;
    let round = store.begin_round(&created.session.id, &branch_id, "hi".to_string()).unwrap();
    let job = store
        .record_job(
            &created.session.id,
            &branch_id,
            round.round_no,
            JobKind::StatusUpdate,
            true,
            "status_update@1".to_string(),
            Item::new(),
        )
        .unwrap()
        .job;

    store
        .update_job_status(
            &created.session.id,
            &job.id,
            JobStatus::Failed,
            Some("boom".to_string()),
            None,
        )
        .unwrap();

    let loaded = store.load_session(&created.session.id).unwrap();
    let r = loaded.round(&branch_id, round.round_no).unwrap();
    assert_eq!(r.status, RoundStatus::Failed);
}

#[test]
fn branch_from_round_keeps_the_snapshot_lss_not_the_parents_current_lss() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let created = store.create_session(Item::new().with("turn_count", 0i64)).unwrap();
    let branch_id = created.default_branch;

    let round1 = store.begin_round(&created.session.id, &branch_id, "turn 1".to_string()).unwrap();
    store
        .apply_state_updates(&created.session.id, &branch_id, Item::new().with("turn_count", 1i64))
        .unwrap();
    let _round2 = store.begin_round(&created.session.id, &branch_id, "turn 2".to_string()).unwrap();
    store
        .apply_state_updates(&created.session.id, &branch_id, Item::new().with("turn_count", 2i64))
        .unwrap();

    let new_branch = store
        .create_branch(&created.session.id, branch_id.clone(), Some(round1.round_no), true)
        .unwrap();

    let loaded = store.load_session(&created.session.id).unwrap();
    assert_eq!(loaded.branch(&new_branch).unwrap().lss.get("turn_count"), Some(&Value::Int(0)));
    assert_eq!(loaded.branch(&branch_id).unwrap().lss.get("turn_count"), Some(&Value::Int(2)));
    assert_eq!(loaded.active_branch_id, new_branch);
}

#[test]
fn list_pending_jobs_only_returns_pending_status() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let created = store.create_session(Item::new()).unwrap();
    let branch_id = created.default_branch;
    let round = store.begin_round(&created.session.id, &branch_id, "hi".to_string()).unwrap();

    let blocking = store
        .record_job(
            &created.session.id,
            &branch_id,
            round.round_no,
            JobKind::StatusUpdate,
            true,
            "status_update@1".to_string(),
            Item::new(),
        )
        .unwrap()
        .job;
    store
        .record_job(
            &created.session.id,
            &branch_id,
            round.round_no,
            JobKind::Guidance,
            false,
            "guidance@1".to_string(),
            Item::new(),
        )
        .unwrap();

    store.mark_job_enqueued(&created.session.id, &blocking.id).unwrap();

    let pending = store.list_pending_jobs(&created.session.id).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, JobKind::Guidance);
}
