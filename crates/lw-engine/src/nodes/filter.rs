// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keeps items where a boolean expression evaluates truthy.

use crate::context::NodeContext;
use crate::expr::{self, Scope};
use crate::registry::Node;
use lw_core::node_result::NodeResult;
use lw_core::value::Items;
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "Filter";

pub struct Filter {
    predicate: String,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            predicate: "`true`".to_string(),
        }
    }
}

impl Filter {
    pub fn from_def(def: &NodeDef) -> Self {
        Self {
            predicate: def
                .params
                .get("where")
                .and_then(|v| v.as_str())
                .unwrap_or("`true`")
                .to_string(),
        }
    }
}

impl Node for Filter {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult {
        let state = ctx.state.get_for_prompt();
        let mut logs = Vec::new();
        let out = items
            .into_iter()
            .filter(|item| {
                let scope = Scope {
                    item,
                    items: &[],
                    state: &state,
                };
                match expr::evaluate_truthy(&self.predicate, &scope) {
                    Ok(keep) => keep,
                    Err(err) => {
                        logs.push(format!("filter: {err}"));
                        false
                    }
                }
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
    use lw_core::value::Item;
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
    async fn keeps_only_items_matching_predicate() {
        let node = Filter {
            predicate: "turn_count > `1`".to_string(),
        };
        let items = vec![int_item(&[("turn_count", 1)]), int_item(&[("turn_count", 2)])];
        let result = node.run(items, &ctx());
        assert_eq!(result.items.len(), 1);
    }

    #[tokio::test]
    async fn defaults_to_keeping_everything() {
        let node = Filter::default();
        let items = vec![Item::new(), Item::new()];
        let result = node.run(items, &ctx());
        assert_eq!(result.items.len(), 2);
    }
}
