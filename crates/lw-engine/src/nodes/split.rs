// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Produces one output item per value of a path that yields a sequence.

use crate::context::NodeContext;
use crate::expr::{self, Scope};
use crate::registry::Node;
use lw_core::node_result::NodeResult;
use lw_core::value::{Item, Items, Value};
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "Split";

#[derive(Default)]
pub struct Split {
    at: String,
}

impl Split {
    pub fn from_def(def: &NodeDef) -> Self {
        Self {
            at: def.params.get("at").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        }
    }
}

impl Node for Split {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult {
        let state = ctx.state.get_for_prompt();
        let mut logs = Vec::new();
        let mut out = Vec::new();

        for item in &items {
            let scope = Scope {
                item,
                items: &[],
                state: &state,
            };
            match expr::evaluate(&self.at, &scope) {
                Ok(Value::Seq(values)) => {
                    for value in values {
                        out.push(match value {
                            Value::Map(m) => Item(m),
                            other => Item::new().with("value", other),
                        });
                    }
                }
                Ok(_) => logs.push(format!("split: path {:?} did not yield a sequence", self.at)),
                Err(err) => logs.push(format!("split: {err}")),
            }
        }

        let mut result = NodeResult::new(out);
        result.logs = logs;
        result
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
        NodeContext::new(
            SessionId::new("s"),
            BranchId::new("b"),
            1,
            StateManager::from_lss(Item::new()),
            Resources::new(Arc::new(FakeLlmAdapter::default()), tokio::runtime::Handle::current()),
        )
    }

    #[tokio::test]
    async fn splits_a_sequence_field_into_one_item_per_value() {
        let node = Split {
            at: "encounters".to_string(),
        };
        let item = Item::new().with(
            "encounters",
            Value::Seq(vec![Value::Str("goblin".to_string()), Value::Str("rat".to_string())]),
        );
        let result = node.run(vec![item], &ctx());
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].get("value"), Some(&Value::Str("goblin".to_string())));
    }

    #[tokio::test]
    async fn logs_when_path_does_not_yield_a_sequence() {
        let node = Split { at: "turn_count".to_string() };
        let item = Item::new().with("turn_count", 3i64);
        let result = node.run(vec![item], &ctx());
        assert!(result.items.is_empty());
        assert!(!result.logs.is_empty());
    }
}
