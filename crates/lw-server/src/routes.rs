// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles every handler module into one `axum::Router<AppState>`.

use axum::routing::{get, post};
use axum::Router;

use crate::chat_api;
use crate::debug_api;
use crate::flow_api;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/flow/run", post(flow_api::run_flow))
        .route("/api/flow/validate", post(flow_api::validate_flow))
        .route("/api/flow/reload", post(flow_api::reload_flows))
        .route("/api/chat/session/start", post(chat_api::start_session))
        .route("/api/chat/send", post(chat_api::send))
        .route(
            "/api/chat/round/:session_id/:branch_id/:round_no/status",
            get(chat_api::round_status),
        )
        .route("/api/chat/round/reroll", post(chat_api::reroll))
        .route("/api/chat/branch", post(chat_api::branch))
        .route("/api/debug/traffic", get(debug_api::traffic))
        .route("/api/debug/traffic/clear", post(debug_api::clear_traffic))
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
