// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use axum::body::to_bytes;
use lw_core::error::EngineError;

async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn schema_error_maps_to_400() {
    let resp = ApiError::Schema("bad doc".to_string()).into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "bad doc");
}

#[tokio::test]
async fn not_found_maps_to_404() {
    let resp = ApiError::NotFound("session not found: s1".to_string()).into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn round_blocked_maps_to_409_with_round_no_and_blockers() {
    let resp = ApiError::RoundBlocked {
        round_no: 1,
        blockers: vec!["job-1".to_string()],
    }
    .into_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["detail"]["error"], "round_blocked");
    assert_eq!(body["detail"]["round_no"], 1);
    assert_eq!(body["detail"]["blockers"][0], "job-1");
}

#[tokio::test]
async fn internal_error_maps_to_500() {
    let resp = ApiError::Internal("boom".to_string()).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn engine_round_blocked_converts_into_api_round_blocked() {
    let err: ApiError = EngineError::RoundBlocked {
        round_no: 3,
        blockers: vec!["job-2".to_string()],
    }
    .into();
    assert!(matches!(err, ApiError::RoundBlocked { round_no: 3, .. }));
}

#[test]
fn store_session_not_found_converts_to_404() {
    let err: ApiError = lw_storage::StoreError::SessionNotFound("s1".to_string()).into();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn validation_body_shapes_valid_outcome() {
    let body = validation_body(lw_engine::ValidateOutcome {
        valid: true,
        error: None,
    });
    assert_eq!(body["valid"], true);
    assert!(body["error"].is_null());
}

#[test]
fn validation_body_shapes_invalid_outcome_with_error() {
    let body = validation_body(lw_engine::ValidateOutcome {
        valid: false,
        error: Some("entry not found".to_string()),
    });
    assert_eq!(body["valid"], false);
    assert_eq!(body["error"], "entry not found");
}
