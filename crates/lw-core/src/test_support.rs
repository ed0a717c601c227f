// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for use across crates.
//!
//! Gated behind `feature = "test-support"`.

use crate::id::{BranchId, SessionId, SnapshotId};
use crate::session::{Round, Session, Snapshot};
use crate::value::{Item, Value};
use indexmap::IndexMap;

/// A session with one branch and no rounds yet, seeded with `state`.
pub fn fresh_session(session_id: &str, branch_id: &str, state: Item) -> Session {
    Session::new(SessionId::new(session_id), BranchId::new(branch_id), state, 0)
}

/// An `Item` built from `(key, value)` pairs of plain integers, handy for
/// state/world fixtures that don't need the full `Value` surface.
pub fn int_item(pairs: &[(&str, i64)]) -> Item {
    let mut m = IndexMap::new();
    for (k, v) in pairs {
        m.insert(k.to_string(), Value::Int(*v));
    }
    Item(m)
}

pub fn snapshot(id: &str, branch_id: &str, taken_at_round_no: u64, lss_copy: Item) -> Snapshot {
    Snapshot {
        id: SnapshotId::new(id),
        branch_id: BranchId::new(branch_id),
        taken_at_round_no,
        lss_copy,
        range: (0, taken_at_round_no),
    }
}

pub fn open_round(branch_id: &str, round_no: u64, anchor_snapshot_id: &str, user_input: &str) -> Round {
    Round::new(
        BranchId::new(branch_id),
        round_no,
        SnapshotId::new(anchor_snapshot_id),
        user_input.to_string(),
    )
}
