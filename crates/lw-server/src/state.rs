// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AppState`: the shared handle bundling every long-lived collaborator
//! an axum handler needs. Cheap to clone (every field is `Arc`-backed),
//! wired up once in `main.rs` and threaded through the listener and
//! background worker tasks.

use lw_adapters::{HttpLlmAdapter, LlmAdapter, Queue, TracedLlmAdapter};
use lw_core::clock::{Clock, SystemClock};
use lw_engine::{NodeRegistry, Resources};
use lw_ir::index::FlowIndex;
use lw_storage::SessionStore;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::ServerConfig;

/// Everything a handler needs: durable storage, the loaded flow set, the
/// node registry, the traced LLM adapter, the job queue, and the config
/// that shaped them.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<SessionStore>,
    pub flows: Arc<RwLock<FlowIndex>>,
    pub registry: NodeRegistry,
    pub llm: Arc<TracedLlmAdapter<HttpLlmAdapter>>,
    pub queue: Arc<dyn Queue>,
    pub clock: Arc<dyn Clock>,
    pub rt: tokio::runtime::Handle,
}

impl AppState {
    /// Builds the `Resources` bag a fresh `NodeContext` needs for one
    /// round, coercing the traced adapter to `Arc<dyn LlmAdapter>` (the
    /// shape nodes are written against).
    pub fn node_resources(&self) -> Resources {
        Resources::new(self.llm.clone() as Arc<dyn LlmAdapter>, self.rt.clone())
    }
}

/// Assembles an `AppState` from config: loads the flow directories,
/// registers the built-in nodes, and wires the LLM adapter and queue per
/// `config.queue_mode`.
pub fn build_state(config: ServerConfig, rt: tokio::runtime::Handle) -> Result<AppState, crate::error::ApiError> {
    let mut flows = FlowIndex::new();
    flows
        .reload(&config.flow_dirs)
        .map_err(|err| crate::error::ApiError::Internal(err.to_string()))?;

    let registry = NodeRegistry::with_builtins();
    let store = SessionStore::new(config.session_store_root.clone());

    let http_adapter = HttpLlmAdapter::new(reqwest::Client::new(), config.model_routes.clone());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let llm = Arc::new(TracedLlmAdapter::new(http_adapter, clock.clone()));

    let queue: Arc<dyn Queue> = match config.queue_mode {
        crate::config::QueueMode::Null => Arc::new(lw_adapters::NullQueue::new()),
        crate::config::QueueMode::Distributed => Arc::new(lw_adapters::DistributedQueue::new()),
    };

    Ok(AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        flows: Arc::new(RwLock::new(flows)),
        registry,
        llm,
        queue,
        clock,
        rt,
    })
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
