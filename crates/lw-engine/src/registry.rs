// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The node registry: type-name → constructor, discovered at init from a
//! fixed list of provider modules, one file per node kind dispatched
//! through a single registration list.

use crate::context::NodeContext;
use indexmap::IndexMap;
use lw_core::value::Items;
use lw_core::node_result::NodeResult;
use lw_ir::doc::NodeDef;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// A pure `items -> NodeResult` transform with access to [`NodeContext`].
pub trait Node: Send + Sync {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult;

    /// Wraps `run`, converting a panic-free failure path into a
    /// `NodeResult` carrying the input items unchanged plus an error log
    /// entry. Atomic nodes report failure this way rather than by
    /// panicking; the executor treats a result tagged as failed as a node
    /// failure when deciding whether to continue a Sequence.
    fn safe_run(&self, items: Items, ctx: &NodeContext) -> (NodeResult, bool) {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.run(items.clone(), ctx))) {
            Ok(result) => (result, false),
            Err(_) => (
                NodeResult::new(items).log("node panicked during execution"),
                true,
            ),
        }
    }
}

pub type NodeConstructor = Arc<dyn Fn(&NodeDef) -> Arc<dyn Node> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("node type {0:?} is already registered")]
    AlreadyRegistered(String),

    #[error("unknown node type: {0:?}")]
    UnknownType(String),
}

#[derive(Default)]
struct RegistryInner {
    constructors: IndexMap<String, NodeConstructor>,
}

/// Process-global (behind a `parking_lot::RwLock`) type-name → constructor
/// map. Read-only after init except across `reload`, which swaps the
/// entire table atomically.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every built-in atomic node. Composite types (Sequence,
    /// If, Subflow) are interpreted directly by the executor and are
    /// never looked up here.
    #[allow(clippy::expect_used)]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::nodes::register_all(&registry).expect("builtin node registration never conflicts");
        registry
    }

    /// Registers `type_name`. Re-registration with a conflicting name is
    /// an error unless `override_existing` is set (used only by reload).
    pub fn register(
        &self,
        type_name: impl Into<String>,
        override_existing: bool,
        constructor: NodeConstructor,
    ) -> Result<(), RegistryError> {
        let type_name = type_name.into();
        let mut inner = self.inner.write();
        if !override_existing && inner.constructors.contains_key(&type_name) {
            return Err(RegistryError::AlreadyRegistered(type_name));
        }
        inner.constructors.insert(type_name, constructor);
        Ok(())
    }

    pub fn construct(&self, node_def: &NodeDef) -> Result<Arc<dyn Node>, RegistryError> {
        let inner = self.inner.read();
        let constructor = inner
            .constructors
            .get(&node_def.type_name)
            .ok_or_else(|| RegistryError::UnknownType(node_def.type_name.clone()))?;
        Ok(constructor(node_def))
    }

    pub fn type_names(&self) -> Vec<String> {
        self.inner.read().constructors.keys().cloned().collect()
    }

    /// Rebuilds the entire registry from scratch under the process-wide
    /// lock, swapping the table atomically.
    pub fn reload(&self) -> Result<(), RegistryError> {
        self.inner.write().constructors.clear();
        crate::nodes::register_all(self)
    }
}
