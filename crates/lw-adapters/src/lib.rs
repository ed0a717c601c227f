// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the LLM chat completion contract and the
//! job queue contract that `lw-server` drives the rest of the engine
//! through.

pub mod llm;
pub mod queue;
pub mod traced;

pub use llm::{ChatMessage, ChatReply, HttpLlmAdapter, LlmAdapter, LlmError, LlmErrorKind, ModelRoute};
pub use queue::{DistributedQueue, NullQueue, Queue, QueueError, QueueStatus, QueuedJob};
pub use traced::{TracedLlmAdapter, TrafficEntry};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use llm::FakeLlmAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use queue::FakeQueue;
