// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invokes a whitelisted function by name.

use crate::context::NodeContext;
use crate::registry::Node;
use lw_core::node_result::NodeResult;
use lw_core::value::Items;
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "Code";

#[derive(Default)]
pub struct Code {
    function: String,
    /// Advisory only: field names the function is expected to set.
    outputs: Vec<String>,
}

impl Code {
    pub fn from_def(def: &NodeDef) -> Self {
        let function = def
            .params
            .get("function")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let outputs = def
            .params
            .get("outputs")
            .and_then(|v| v.as_seq())
            .map(|seq| seq.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        Self { function, outputs }
    }
}

impl Node for Code {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult {
        let Some(code_fn) = ctx.resources.code_funcs.get(&self.function) else {
            return NodeResult::new(items)
                .log(format!("code: function {:?} is not whitelisted", self.function));
        };

        match code_fn(items.clone(), ctx) {
            Ok(out_items) => {
                let mut result = NodeResult::new(out_items);
                for field in &self.outputs {
                    if !result.items.iter().any(|i| i.contains_key(field)) {
                        result.logs.push(format!(
                            "code: function {:?} did not set advertised output {field:?}",
                            self.function
                        ));
                    }
                }
                result
            }
            Err(message) => NodeResult::new(items).log(format!("code: {message}")),
        }
    }
}
