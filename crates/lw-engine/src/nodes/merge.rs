// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity on the current stream; optionally appends a constant sequence.
//!
//! True multi-input fan-in is aspirational (see Design Notes); `Merge` is
//! single-stream for now.

use crate::context::NodeContext;
use crate::registry::Node;
use lw_core::node_result::NodeResult;
use lw_core::value::{Item, Items, Value};
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "Merge";

#[derive(Default)]
pub struct Merge {
    with: Items,
}

impl Merge {
    pub fn from_def(def: &NodeDef) -> Self {
        let with = def
            .params
            .get("with")
            .and_then(|v| v.as_seq())
            .map(|seq| {
                seq.iter()
                    .map(|v| match v {
                        Value::Map(m) => Item(m.clone()),
                        other => Item::new().with("value", other.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { with }
    }
}

impl Node for Merge {
    fn run(&self, mut items: Items, _ctx: &NodeContext) -> NodeResult {
        items.extend(self.with.iter().cloned());
        NodeResult::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> NodeContext {
        use crate::context::Resources;
        use crate::state_manager::StateManager;
        use lw_adapters::FakeLlmAdapter;
        use lw_core::{BranchId, SessionId};
        use std::sync::Arc;
        NodeContext::new(
            SessionId::new("s"),
            BranchId::new("b"),
            1,
            StateManager::from_lss(Item::new()),
            Resources::new(Arc::new(FakeLlmAdapter::default()), tokio::runtime::Handle::current()),
        )
    }

    #[tokio::test]
    async fn is_identity_with_no_with_clause() {
        let node = Merge::default();
        let items = vec![Item::new().with("a", 1i64)];
        let result = node.run(items.clone(), &ctx());
        assert_eq!(result.items, items);
    }

    #[tokio::test]
    async fn appends_constant_sequence() {
        let node = Merge {
            with: vec![Item::new().with("injected", true)],
        };
        let result = node.run(vec![Item::new()], &ctx());
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[1].get("injected"), Some(&Value::Bool(true)));
    }
}
