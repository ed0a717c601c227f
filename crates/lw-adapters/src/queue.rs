// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue adapters. `Queue` is the seam the Outbox Poller enqueues
//! through and the Job Worker drains; `Distributed` is a generic broker
//! client behind the trait, `Null` runs jobs inline with no deferred
//! dispatch at all.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue unavailable: {0}")]
    Unavailable(String),
    #[error("job not found: {0}")]
    NotFound(String),
}

/// A unit of dispatch handed from the Outbox to a `Queue`.
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub job_id: String,
    pub session_id: String,
    pub kind: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Queued,
    Running,
    Done,
}

/// Adapter for handing jobs off to whatever drains the queue.
#[async_trait]
pub trait Queue: Send + Sync + 'static {
    async fn enqueue(&self, job: QueuedJob) -> Result<(), QueueError>;

    async fn status(&self, job_id: &str) -> Result<Option<QueueStatus>, QueueError>;

    /// Pop the next queued job, if any, for a worker to run. `Null` never
    /// has anything to pop since it runs inline at `enqueue` time.
    async fn claim_next(&self) -> Result<Option<QueuedJob>, QueueError>;
}

struct DistributedState {
    pending: VecDeque<QueuedJob>,
    statuses: HashMap<String, QueueStatus>,
}

/// In-process channel-backed broker stub. Stands in for a real message
/// broker client the way `FakeAgentAdapter` stands in for a real one:
/// same `Queue` contract, no network.
pub struct DistributedQueue {
    inner: Arc<Mutex<DistributedState>>,
}

impl Default for DistributedQueue {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(DistributedState {
                pending: VecDeque::new(),
                statuses: HashMap::new(),
            })),
        }
    }
}

impl DistributedQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Queue for DistributedQueue {
    async fn enqueue(&self, job: QueuedJob) -> Result<(), QueueError> {
        let mut inner = self.inner.lock();
        inner.statuses.insert(job.job_id.clone(), QueueStatus::Queued);
        inner.pending.push_back(job);
        Ok(())
    }

    async fn status(&self, job_id: &str) -> Result<Option<QueueStatus>, QueueError> {
        Ok(self.inner.lock().statuses.get(job_id).copied())
    }

    async fn claim_next(&self) -> Result<Option<QueuedJob>, QueueError> {
        let mut inner = self.inner.lock();
        let job = inner.pending.pop_front();
        if let Some(job) = &job {
            inner.statuses.insert(job.job_id.clone(), QueueStatus::Running);
        }
        Ok(job)
    }
}

/// No queue at all: `enqueue` marks the job `Done` immediately, and
/// `claim_next` never yields anything for a worker to pull. Used for
/// the inline synchronous deployment mode, where the job worker is
/// invoked directly by the caller instead of polling.
pub struct NullQueue {
    statuses: Mutex<HashMap<String, QueueStatus>>,
}

impl Default for NullQueue {
    fn default() -> Self {
        Self {
            statuses: Mutex::new(HashMap::new()),
        }
    }
}

impl NullQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Queue for NullQueue {
    async fn enqueue(&self, job: QueuedJob) -> Result<(), QueueError> {
        self.statuses.lock().insert(job.job_id, QueueStatus::Done);
        Ok(())
    }

    async fn status(&self, job_id: &str) -> Result<Option<QueueStatus>, QueueError> {
        Ok(self.statuses.lock().get(job_id).copied())
    }

    async fn claim_next(&self) -> Result<Option<QueuedJob>, QueueError> {
        Ok(None)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;

    /// Records enqueue calls for assertions, otherwise behaves like
    /// `DistributedQueue`.
    pub struct FakeQueue {
        delegate: DistributedQueue,
        enqueued: Mutex<Vec<QueuedJob>>,
    }

    impl Default for FakeQueue {
        fn default() -> Self {
            Self {
                delegate: DistributedQueue::default(),
                enqueued: Mutex::new(Vec::new()),
            }
        }
    }

    impl FakeQueue {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn enqueued(&self) -> Vec<QueuedJob> {
            self.enqueued.lock().clone()
        }
    }

    #[async_trait]
    impl Queue for FakeQueue {
        async fn enqueue(&self, job: QueuedJob) -> Result<(), QueueError> {
            self.enqueued.lock().push(job.clone());
            self.delegate.enqueue(job).await
        }

        async fn status(&self, job_id: &str) -> Result<Option<QueueStatus>, QueueError> {
            self.delegate.status(job_id).await
        }

        async fn claim_next(&self) -> Result<Option<QueuedJob>, QueueError> {
            self.delegate.claim_next().await
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeQueue;

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
