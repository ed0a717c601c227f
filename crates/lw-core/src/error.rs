// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level error kinds shared across the workspace. Individual crates
//! define their own narrower error enums (`lw-storage::StoreError`,
//! `lw-adapters::LlmError`, `lw-engine::ExprError`, ...) and convert into
//! this one at their public boundary via `#[from]`.

use thiserror::Error;

/// One of the error kinds enumerated in the engine's error handling design.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    NotFound,
    Expression,
    AdapterTimeout,
    AdapterUnavailable,
    AdapterProtocol,
    StateConflict,
    RoundBlocked,
    QueueUnavailable,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Schema => "schema",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Expression => "expression",
            ErrorKind::AdapterTimeout => "adapter_timeout",
            ErrorKind::AdapterUnavailable => "adapter_unavailable",
            ErrorKind::AdapterProtocol => "adapter_protocol",
            ErrorKind::StateConflict => "state_conflict",
            ErrorKind::RoundBlocked => "round_blocked",
            ErrorKind::QueueUnavailable => "queue_unavailable",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

/// The engine-wide error type returned across crate boundaries.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("schema error: {0}")]
    Schema(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("expression error: {0}")]
    Expression(String),

    #[error("adapter timed out: {0}")]
    AdapterTimeout(String),

    #[error("adapter unavailable: {0}")]
    AdapterUnavailable(String),

    #[error("adapter protocol error: {0}")]
    AdapterProtocol(String),

    #[error("state conflict: {0}")]
    StateConflict(String),

    #[error("round {round_no} is blocked: {blockers:?}")]
    RoundBlocked { round_no: u64, blockers: Vec<String> },

    #[error("queue unavailable: {0}")]
    QueueUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Schema(_) => ErrorKind::Schema,
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::Expression(_) => ErrorKind::Expression,
            EngineError::AdapterTimeout(_) => ErrorKind::AdapterTimeout,
            EngineError::AdapterUnavailable(_) => ErrorKind::AdapterUnavailable,
            EngineError::AdapterProtocol(_) => ErrorKind::AdapterProtocol,
            EngineError::StateConflict(_) => ErrorKind::StateConflict,
            EngineError::RoundBlocked { .. } => ErrorKind::RoundBlocked,
            EngineError::QueueUnavailable(_) => ErrorKind::QueueUnavailable,
            EngineError::Internal(_) => ErrorKind::Internal,
        }
    }
}
