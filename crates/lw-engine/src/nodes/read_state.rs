// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copies keys from the prompt-view of state into each item.

use crate::context::NodeContext;
use crate::registry::Node;
use indexmap::IndexMap;
use lw_core::node_result::NodeResult;
use lw_core::value::Items;
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "ReadState";

#[derive(Default)]
pub struct ReadState {
    /// source key -> destination field; same-named when sourced from `keys`.
    map: IndexMap<String, String>,
}

impl ReadState {
    pub fn from_def(def: &NodeDef) -> Self {
        if let Some(map) = def.params.get("map").and_then(|v| v.as_map()) {
            let map = map
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|dest| (k.clone(), dest.to_string())))
                .collect();
            return Self { map };
        }
        let keys = def
            .params
            .get("keys")
            .and_then(|v| v.as_seq())
            .map(|seq| seq.iter().filter_map(|v| v.as_str()).map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();
        Self {
            map: keys.into_iter().map(|k| (k.clone(), k)).collect(),
        }
    }
}

impl Node for ReadState {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult {
        let prompt_view = ctx.state.get_for_prompt();
        let out = items
            .into_iter()
            .map(|mut item| {
                for (source, dest) in &self.map {
                    if let Some(value) = prompt_view.get(source) {
                        item.set(dest.clone(), value.clone());
                    }
                }
                item
            })
            .collect();
        NodeResult::new(out)
    }
}
