// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::ApiError;
use crate::test_support::test_state;
use lw_core::value::Value;

#[tokio::test(flavor = "multi_thread")]
async fn send_opens_round_one_and_blocks_on_the_status_update_job() {
    let (state, _dir) = test_state();
    let started = start_session(&state, None, false).unwrap();

    let sent = send(
        &state,
        started.session_id.clone(),
        None,
        "enter tavern".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap();

    assert_eq!(sent.round_no, 1);
    assert_eq!(sent.round_status.status, "blocked");
    assert!(!sent.round_status.blockers.is_empty());
    assert_eq!(sent.state_snapshot.get("turn_count"), Some(&Value::Int(1)));
}

#[tokio::test(flavor = "multi_thread")]
async fn send_rejects_a_second_round_while_the_first_is_blocked() {
    let (state, _dir) = test_state();
    let started = start_session(&state, None, false).unwrap();
    send(
        &state,
        started.session_id.clone(),
        None,
        "enter tavern".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap();

    let err = send(
        &state,
        started.session_id.clone(),
        None,
        "look around".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap_err();

    match err {
        ApiError::RoundBlocked { round_no, blockers } => {
            assert_eq!(round_no, 1);
            assert!(!blockers.is_empty());
        }
        other => panic!("expected RoundBlocked, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn send_succeeds_again_once_the_blocking_job_completes() {
    let (state, _dir) = test_state();
    let started = start_session(&state, None, false).unwrap();
    let first = send(
        &state,
        started.session_id.clone(),
        None,
        "enter tavern".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap();

    // Drive the status_update job to completion directly, as the Outbox
    // Poller would via `job::execute`.
    let session = state.store.load_session(&lw_core::SessionId::new(started.session_id.clone())).unwrap();
    let job_id = session.jobs.iter().find(|j| j.kind == lw_core::JobKind::StatusUpdate).unwrap().id.clone();
    let job = state.store.get_job(&lw_core::SessionId::new(started.session_id.clone()), &job_id).unwrap();
    crate::job::execute(&state, job).await.unwrap();

    let status = round_status(
        &state,
        started.session_id.clone(),
        started.branch_id.clone(),
        first.round_no,
    )
    .unwrap();
    assert_eq!(status.status, "completed");
    assert!(status.blockers.is_empty());

    let second = send(
        &state,
        started.session_id,
        None,
        "look around".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap();
    assert_eq!(second.round_no, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn reroll_keeps_the_round_number_and_does_not_add_a_job() {
    let (state, _dir) = test_state();
    let started = start_session(&state, None, false).unwrap();
    send(
        &state,
        started.session_id.clone(),
        None,
        "enter tavern".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap();

    let session_id = lw_core::SessionId::new(started.session_id.clone());
    let jobs_before = state.store.load_session(&session_id).unwrap().jobs.len();

    let rerolled = reroll(
        &state,
        started.session_id.clone(),
        started.branch_id.clone(),
        1,
        "main@1".to_string(),
        None,
    )
    .unwrap();
    assert_eq!(rerolled.round_no, 1);

    let jobs_after = state.store.load_session(&session_id).unwrap().jobs.len();
    assert_eq!(jobs_before, jobs_after);

    // turn_count was re-derived from the round-1 snapshot (turn_count=0),
    // so it's still 1 after the reroll, not 2.
    assert_eq!(rerolled.state_snapshot.get("turn_count"), Some(&Value::Int(1)));
}

#[tokio::test(flavor = "multi_thread")]
async fn branch_from_round_one_starts_from_that_rounds_snapshot() {
    let (state, _dir) = test_state();
    let started = start_session(&state, None, false).unwrap();
    send(
        &state,
        started.session_id.clone(),
        None,
        "enter tavern".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap();

    let session_id = lw_core::SessionId::new(started.session_id.clone());
    let job_id = state
        .store
        .load_session(&session_id)
        .unwrap()
        .jobs
        .iter()
        .find(|j| j.kind == lw_core::JobKind::StatusUpdate)
        .unwrap()
        .id
        .clone();
    let job = state.store.get_job(&session_id, &job_id).unwrap();
    crate::job::execute(&state, job).await.unwrap();

    send(
        &state,
        started.session_id.clone(),
        None,
        "look around".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap();

    let new_branch = branch(&state, started.session_id.clone(), Some(1), None, true).unwrap();

    let session = state.store.load_session(&session_id).unwrap();
    let new_branch_id = lw_core::BranchId::new(new_branch.clone());
    assert_eq!(session.branch(&new_branch_id).unwrap().lss.get("turn_count"), Some(&Value::Int(1)));
    assert_eq!(session.active_branch_id, new_branch_id);

    let on_new_branch = send(
        &state,
        started.session_id,
        Some(new_branch),
        "peek outside".to_string(),
        "main@1".to_string(),
        None,
    )
    .unwrap();
    assert_eq!(on_new_branch.round_no, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn round_status_reports_not_found_for_unknown_round() {
    let (state, _dir) = test_state();
    let started = start_session(&state, None, false).unwrap();
    let err = round_status(&state, started.session_id, started.branch_id, 99).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
