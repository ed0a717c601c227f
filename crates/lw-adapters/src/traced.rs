// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced wrapper for any `LlmAdapter`, recording request/response pairs
//! for `/api/debug/traffic`.

use crate::llm::{ChatMessage, ChatReply, LlmAdapter, LlmError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// One recorded call, shaped for direct serialization onto the debug
/// traffic endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficEntry {
    pub id: u64,
    pub ts_ms: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub service: &'static str,
    pub method: &'static str,
    pub url: String,
    pub req_headers: Vec<(String, String)>,
    pub req_body: serde_json::Value,
    pub status: Option<&'static str>,
    pub elapsed_ms: u64,
    pub resp_headers: Vec<(String, String)>,
    pub resp_body: Option<serde_json::Value>,
    pub error: Option<String>,
    pub pair_id: u64,
}

const DEFAULT_CAPACITY: usize = 512;

/// Wraps any `LlmAdapter`, appending a `TrafficEntry` per call to a
/// bounded in-memory ring buffer.
pub struct TracedLlmAdapter<A> {
    inner: A,
    clock: Arc<dyn lw_core::clock::Clock>,
    next_id: AtomicU64,
    buffer: Mutex<VecDeque<TrafficEntry>>,
    capacity: usize,
}

impl<A> TracedLlmAdapter<A> {
    pub fn new(inner: A, clock: Arc<dyn lw_core::clock::Clock>) -> Self {
        Self {
            inner,
            clock,
            next_id: AtomicU64::new(1),
            buffer: Mutex::new(VecDeque::with_capacity(DEFAULT_CAPACITY)),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Snapshot of recorded traffic, newest last.
    pub fn traffic(&self) -> Vec<TrafficEntry> {
        self.buffer.lock().iter().cloned().collect()
    }

    /// Drops all recorded traffic, backing `/api/debug/traffic/clear`.
    pub fn clear_traffic(&self) {
        self.buffer.lock().clear();
    }

    fn record(&self, entry: TrafficEntry) {
        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry);
    }
}

#[async_trait]
impl<A: LlmAdapter> LlmAdapter for TracedLlmAdapter<A> {
    async fn chat(
        &self,
        model_alias: &str,
        messages: Vec<ChatMessage>,
        timeout: Option<Duration>,
    ) -> Result<ChatReply, LlmError> {
        let pair_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let span = tracing::info_span!("llm.chat", model_alias, pair_id);
        async {
            let start = std::time::Instant::now();
            tracing::info!(message_count = messages.len(), "dispatching chat request");
            let result = self.inner.chat(model_alias, messages.clone(), timeout).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            let req_body = serde_json::json!({ "model": model_alias, "messages": messages });
            let entry = match &result {
                Ok(reply) => {
                    tracing::info!(elapsed_ms, "chat request completed");
                    TrafficEntry {
                        id: pair_id,
                        ts_ms: self.clock.now_ms(),
                        kind: "llm",
                        service: "llm",
                        method: "chat",
                        url: model_alias.to_string(),
                        req_headers: Vec::new(),
                        req_body,
                        status: Some("ok"),
                        elapsed_ms,
                        resp_headers: Vec::new(),
                        resp_body: reply.raw.clone().or_else(|| Some(serde_json::json!({ "text": reply.text }))),
                        error: None,
                        pair_id,
                    }
                }
                Err(err) => {
                    tracing::error!(elapsed_ms, error = %err, "chat request failed");
                    TrafficEntry {
                        id: pair_id,
                        ts_ms: self.clock.now_ms(),
                        kind: "llm",
                        service: "llm",
                        method: "chat",
                        url: model_alias.to_string(),
                        req_headers: Vec::new(),
                        req_body,
                        status: Some("error"),
                        elapsed_ms,
                        resp_headers: Vec::new(),
                        resp_body: None,
                        error: Some(err.to_string()),
                        pair_id,
                    }
                }
            };
            self.record(entry);
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
