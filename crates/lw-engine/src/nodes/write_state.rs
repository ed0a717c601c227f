// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writes fields from items back into state via `update_state_sync`.

use crate::context::NodeContext;
use crate::registry::Node;
use indexmap::IndexMap;
use lw_core::node_result::NodeResult;
use lw_core::value::{Item, Items};
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "WriteState";

#[derive(Default)]
pub struct WriteState {
    /// item_field -> state_key
    from_item_map: IndexMap<String, String>,
    per_item: bool,
}

impl WriteState {
    pub fn from_def(def: &NodeDef) -> Self {
        let from_item_map = def
            .params
            .get("from_item_map")
            .and_then(|v| v.as_map())
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|dest| (k.clone(), dest.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        let per_item = def
            .params
            .get("per_item")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Self { from_item_map, per_item }
    }

    fn collect_updates(&self, item: &Item) -> Item {
        let mut updates = Item::new();
        for (field, state_key) in &self.from_item_map {
            if let Some(value) = item.get(field) {
                updates.set(state_key.clone(), value.clone());
            }
        }
        updates
    }
}

impl Node for WriteState {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult {
        if self.per_item {
            for item in &items {
                ctx.state.update_state_sync(self.collect_updates(item));
            }
        } else if let Some(first) = items.first() {
            ctx.state.update_state_sync(self.collect_updates(first));
        }
        NodeResult::new(items)
    }
}
