// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ApiError`: the one error type every handler returns, mapped onto
//! HTTP status codes and a `{detail}` body via an axum `IntoResponse`
//! implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lw_core::error::EngineError;
use serde::Serialize;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// 400: malformed request body or invalid IR.
    Schema(String),
    /// 404: missing session/branch/round/flow reference.
    NotFound(String),
    /// 400: a JMESPath expression failed to compile or evaluate.
    Expression(String),
    /// 409: the round is blocked by unfinished blocking jobs.
    RoundBlocked { round_no: u64, blockers: Vec<String> },
    /// 500: adapter or queue failure that isn't a user-facing 4xx.
    Internal(String),
}

#[derive(Serialize)]
struct DetailBody<T: Serialize> {
    detail: T,
}

#[derive(Serialize)]
struct RoundBlockedDetail {
    error: &'static str,
    round_no: u64,
    blockers: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Schema(msg) => (StatusCode::BAD_REQUEST, Json(DetailBody { detail: msg })).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, Json(DetailBody { detail: msg })).into_response(),
            ApiError::Expression(msg) => (StatusCode::BAD_REQUEST, Json(DetailBody { detail: msg })).into_response(),
            ApiError::RoundBlocked { round_no, blockers } => (
                StatusCode::CONFLICT,
                Json(DetailBody {
                    detail: RoundBlockedDetail {
                        error: "round_blocked",
                        round_no,
                        blockers,
                    },
                }),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(DetailBody { detail: msg })).into_response()
            }
        }
    }
}

/// Maps the engine-wide error kinds onto their HTTP status classes.
/// `round_blocked` never actually reaches here in practice (the chat
/// pipeline constructs `ApiError::RoundBlocked` directly, since it needs
/// the round number and blocker list alongside the kind) but the
/// conversion is kept total for any other call site that only has an
/// `EngineError` to hand.
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Schema(msg) => ApiError::Schema(msg),
            EngineError::NotFound(msg) => ApiError::NotFound(msg),
            EngineError::Expression(msg) => ApiError::Expression(msg),
            EngineError::RoundBlocked { round_no, blockers } => ApiError::RoundBlocked {
                round_no,
                blockers: blockers.into_iter().collect(),
            },
            EngineError::AdapterTimeout(msg)
            | EngineError::AdapterUnavailable(msg)
            | EngineError::AdapterProtocol(msg)
            | EngineError::StateConflict(msg)
            | EngineError::QueueUnavailable(msg)
            | EngineError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<lw_storage::StoreError> for ApiError {
    fn from(err: lw_storage::StoreError) -> Self {
        match err {
            lw_storage::StoreError::SessionNotFound(id) => ApiError::NotFound(format!("session not found: {id}")),
            lw_storage::StoreError::BranchNotFound(id) => ApiError::NotFound(format!("branch not found: {id}")),
            lw_storage::StoreError::RoundNotFound(branch, round_no) => {
                ApiError::NotFound(format!("round not found: branch {branch} round {round_no}"))
            }
            lw_storage::StoreError::SnapshotNotFound(id) => ApiError::NotFound(format!("snapshot not found: {id}")),
            lw_storage::StoreError::JobNotFound(id) => ApiError::NotFound(format!("job not found: {id}")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<lw_ir::index::IndexError> for ApiError {
    fn from(err: lw_ir::index::IndexError) -> Self {
        match err {
            lw_ir::index::IndexError::NotFound(flow_ref) => {
                ApiError::NotFound(format!("flow reference not found: {flow_ref}"))
            }
            other => ApiError::Schema(other.to_string()),
        }
    }
}

impl From<lw_engine::ExecuteError> for ApiError {
    fn from(err: lw_engine::ExecuteError) -> Self {
        match err {
            lw_engine::ExecuteError::Index(inner) => inner.into(),
            lw_engine::ExecuteError::Expr(inner) => ApiError::Expression(inner.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<lw_engine::RegistryError> for ApiError {
    fn from(err: lw_engine::RegistryError) -> Self {
        ApiError::Schema(err.to_string())
    }
}

/// Helper used by `flow_api::validate` to shape the non-error `{valid,
/// error}` body, kept here alongside the rest of the response-shaping
/// glue.
pub fn validation_body(outcome: lw_engine::ValidateOutcome) -> serde_json::Value {
    json!({ "valid": outcome.valid, "error": outcome.error })
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
