// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage for the session tree: one directory per session, a
//! canonical JSON document per session, atomic whole-document replace.
//! No WAL — crash recovery works from the last durable document plus a
//! heartbeat-staleness scan over in-flight jobs.

mod doc;
mod error;
mod recovery;
mod store;

pub use doc::CURRENT_DOC_VERSION;
pub use error::StoreError;
pub use recovery::recover_stale_jobs;
pub use store::{BeginRoundOutcome, CreateSessionOutcome, RecordJobOutcome, SessionStore};
