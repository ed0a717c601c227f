// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compress(String),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("branch not found: {0}")]
    BranchNotFound(String),
    #[error("round not found: branch {0} round {1}")]
    RoundNotFound(String, u64),
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),
    #[error("job not found: {0}")]
    JobNotFound(String),
}
