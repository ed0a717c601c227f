// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lw-core: data model for the Loomwork interactive-fiction workflow engine.
//!
//! Holds the items bus (`Value`/`Item`/`Items`), the session tree (session,
//! branch, round, snapshot, job, outbox), and the shared error/id/clock
//! types every other crate builds on. Contains no execution logic.

pub mod clock;
pub mod error;
pub mod id;
pub mod node_result;
pub mod session;
#[cfg(feature = "test-support")]
pub mod test_support;
pub mod value;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::EngineError;
pub use id::{BranchId, IdGen, JobId, SequentialIdGen, SessionId, ShortId, SnapshotId, UuidIdGen};
pub use node_result::{merge_logs, merge_metrics, MetricValue, Metrics, NodeResult};
pub use session::{
    Job, JobKind, JobStatus, OutboxEntry, Round, RoundStatus, Session, SessionBranch, Snapshot,
    StateData,
};
pub use value::{Item, Items, Value};
