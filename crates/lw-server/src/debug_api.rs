// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/debug/traffic`: inspects and clears the LLM adapter's traced
//! request/response ring buffer. Read-only operational surface, not
//! gated behind any session.

use axum::extract::{Query, State};
use axum::Json;
use lw_adapters::TrafficEntry;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrafficQuery {
    pub limit: Option<usize>,
}

/// `GET /api/debug/traffic?limit=N`. Returns the `limit` most recent
/// entries (all of them if `limit` is omitted).
pub async fn traffic(State(state): State<AppState>, Query(query): Query<TrafficQuery>) -> Json<Vec<TrafficEntry>> {
    let mut entries = state.llm.traffic();
    if let Some(limit) = query.limit {
        if entries.len() > limit {
            entries = entries.split_off(entries.len() - limit);
        }
    }
    Json(entries)
}

#[derive(Debug, Serialize)]
pub struct ClearTrafficResponse {
    pub cleared: bool,
}

/// `POST /api/debug/traffic/clear`.
pub async fn clear_traffic(State(state): State<AppState>) -> Json<ClearTrafficResponse> {
    state.llm.clear_traffic();
    Json(ClearTrafficResponse { cleared: true })
}

#[cfg(test)]
#[path = "debug_api_tests.rs"]
mod tests;
