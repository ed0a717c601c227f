// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Working/Last-Stable-State dual-state manager. All mutations are
//! serialized by a per-session `parking_lot::Mutex` guarding the shared
//! state.

use lw_core::session::StateData;
use lw_core::value::{Item, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// A handle to one session/branch's dual-state. Cheap to clone; clones
/// share the same underlying lock.
#[derive(Clone)]
pub struct StateManager {
    inner: Arc<Mutex<StateData>>,
}

impl StateManager {
    pub fn new(initial: StateData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn from_lss(lss: Item) -> Self {
        Self::new(StateData::from_lss(lss))
    }

    /// A deep copy of Working.
    pub fn get_working_state(&self) -> Item {
        self.inner.lock().working.clone()
    }

    pub fn read(&self, key: &str) -> Option<Value> {
        self.inner.lock().working.get(key).cloned()
    }

    /// Working with each pending key overridden by its LSS value.
    pub fn get_for_prompt(&self) -> Item {
        self.inner.lock().for_prompt()
    }

    /// Applies `updates` to both Working and LSS atomically; never
    /// touches `pending`.
    pub fn update_state_sync(&self, updates: Item) {
        self.inner.lock().update_sync(updates);
    }

    /// Marks `keys` as pending an asynchronous refresh (idempotent).
    pub fn start_async_update(&self, keys: impl IntoIterator<Item = String>) {
        self.inner.lock().start_async_update(keys);
    }

    /// Writes `updates` to LSS and Working and clears their keys from
    /// `pending`.
    pub fn complete_async_update(&self, updates: Item) {
        self.inner.lock().complete_async_update(updates);
    }

    /// A deep copy of the current LSS, e.g. to anchor a new snapshot.
    pub fn snapshot_lss(&self) -> Item {
        self.inner.lock().lss.clone()
    }

    pub fn pending_keys(&self) -> Vec<String> {
        self.inner.lock().pending.iter().cloned().collect()
    }
}
