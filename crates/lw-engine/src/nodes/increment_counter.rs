// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Increments a state counter by a fixed step, creating it at 0 if absent.

use crate::context::NodeContext;
use crate::registry::Node;
use lw_core::node_result::NodeResult;
use lw_core::value::{Item, Items, Value};
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "IncrementCounter";

pub struct IncrementCounter {
    field: String,
    step: i64,
}

impl IncrementCounter {
    pub fn from_def(def: &NodeDef) -> Self {
        Self {
            field: def
                .params
                .get("field")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            step: def.params.get("step").and_then(|v| v.as_int()).unwrap_or(1),
        }
    }
}

impl Node for IncrementCounter {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult {
        let current = ctx.state.read(&self.field).and_then(|v| v.as_int()).unwrap_or(0);
        ctx.state
            .update_state_sync(Item::new().with(self.field.clone(), Value::Int(current + self.step)));
        NodeResult::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Resources;
    use crate::state_manager::StateManager;
    use lw_adapters::FakeLlmAdapter;
    use lw_core::{BranchId, SessionId};
    use std::sync::Arc;

    fn ctx() -> NodeContext {
        let rt = tokio::runtime::Handle::current();
        NodeContext::new(
            SessionId::new("s"),
            BranchId::new("b"),
            1,
            StateManager::from_lss(Item::new()),
            Resources::new(Arc::new(FakeLlmAdapter::default()), rt),
        )
    }

    #[tokio::test]
    async fn creates_counter_at_zero_then_increments() {
        let node = IncrementCounter {
            field: "turn_count".to_string(),
            step: 1,
        };
        let ctx = ctx();
        node.run(vec![], &ctx);
        assert_eq!(ctx.state.read("turn_count"), Some(Value::Int(1)));
        node.run(vec![], &ctx);
        assert_eq!(ctx.state.read("turn_count"), Some(Value::Int(2)));
    }

    #[tokio::test]
    async fn respects_custom_step() {
        let node = IncrementCounter {
            field: "score".to_string(),
            step: 5,
        };
        let ctx = ctx();
        node.run(vec![], &ctx);
        assert_eq!(ctx.state.read("score"), Some(Value::Int(5)));
    }
}
