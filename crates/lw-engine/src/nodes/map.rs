// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sets fields on each item from expressions evaluated over that item.

use crate::context::NodeContext;
use crate::expr::{self, Scope};
use crate::registry::Node;
use indexmap::IndexMap;
use lw_core::node_result::NodeResult;
use lw_core::value::Items;
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "Map";

#[derive(Default)]
pub struct Map {
    /// destination field -> expression
    set: IndexMap<String, String>,
}

impl Map {
    pub fn from_def(def: &NodeDef) -> Self {
        let set = def
            .params
            .get("set")
            .and_then(|v| v.as_map())
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|expr| (k.clone(), expr.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        Self { set }
    }
}

impl Node for Map {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult {
        let state = ctx.state.get_for_prompt();
        let mut logs = Vec::new();
        let out = items
            .into_iter()
            .map(|mut item| {
                for (field, expression) in &self.set {
                    let scope = Scope {
                        item: &item,
                        items: &[],
                        state: &state,
                    };
                    match expr::evaluate(expression, &scope) {
                        Ok(value) => {
                            item.set(field.clone(), value);
                        }
                        Err(err) => logs.push(format!("map: {field}: {err}")),
                    }
                }
                item
            })
            .collect();
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
    use lw_core::test_support::int_item;
    use lw_core::value::{Item, Value};
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
    async fn sets_field_from_expression_over_item() {
        let node = Map {
            set: [("doubled".to_string(), "turn_count".to_string())].into_iter().collect(),
        };
        let item = int_item(&[("turn_count", 4)]);
        let result = node.run(vec![item], &ctx());
        assert_eq!(result.items[0].get("doubled"), Some(&Value::Int(4)));
    }

    #[tokio::test]
    async fn logs_but_does_not_abort_on_bad_expression() {
        let node = Map {
            set: [("x".to_string(), "[".to_string())].into_iter().collect(),
        };
        let result = node.run(vec![Item::new()], &ctx());
        assert_eq!(result.items.len(), 1);
        assert!(!result.logs.is_empty());
    }
}
