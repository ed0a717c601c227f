// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Calls the LLM adapter with each item's message history.

use crate::context::NodeContext;
use crate::registry::Node;
use lw_adapters::{ChatMessage, LlmError};
use lw_core::node_result::NodeResult;
use lw_core::value::{Item, Items, Value};
use lw_ir::doc::NodeDef;

pub const TYPE_NAME: &str = "LLMChat";

pub struct LlmChat {
    model: String,
    messages_from: String,
    response_field: String,
}

impl LlmChat {
    pub fn from_def(def: &NodeDef) -> Self {
        Self {
            model: def
                .params
                .get("model")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            messages_from: def
                .params
                .get("messages_from")
                .and_then(|v| v.as_str())
                .unwrap_or("messages")
                .to_string(),
            response_field: def
                .params
                .get("response_field")
                .and_then(|v| v.as_str())
                .unwrap_or("llm_response")
                .to_string(),
        }
    }

    fn extract_messages(&self, item: &Item) -> Vec<ChatMessage> {
        item.get(&self.messages_from)
            .and_then(Value::as_seq)
            .map(|seq| {
                seq.iter()
                    .filter_map(|entry| {
                        let map = entry.as_map()?;
                        let role = map.get("role")?.as_str()?.to_string();
                        let content = map.get("content")?.as_str()?.to_string();
                        Some(ChatMessage { role, content })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Node for LlmChat {
    fn run(&self, items: Items, ctx: &NodeContext) -> NodeResult {
        let mut out = Vec::with_capacity(items.len());
        let mut logs = Vec::new();

        for item in items {
            let messages = self.extract_messages(&item);
            let rt = ctx.resources.rt.clone();
            let llm = ctx.resources.llm.clone();
            let model = self.model.clone();
            let outcome = tokio::task::block_in_place(move || rt.block_on(llm.chat(&model, messages, None)));

            let mut item = item;
            match outcome {
                Ok(reply) => {
                    item.set(self.response_field.clone(), reply.text);
                }
                Err(LlmError::Unavailable(msg)) => {
                    logs.push(format!("llm_chat: adapter unavailable: {msg}"));
                }
                Err(err) => {
                    logs.push(format!("llm_chat: {err}"));
                }
            }
            out.push(item);
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
        let rt = tokio::runtime::Handle::current();
        let resources = Resources::new(Arc::new(FakeLlmAdapter::scripted("a story reply")), rt);
        NodeContext::new(
            SessionId::new("s"),
            BranchId::new("b"),
            1,
            StateManager::from_lss(Item::new()),
            resources,
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn writes_reply_to_response_field() {
        let node = LlmChat {
            model: "flagship".to_string(),
            messages_from: "messages".to_string(),
            response_field: "llm_response".to_string(),
        };
        let item = Item::new().with(
            "messages",
            Value::Seq(vec![Value::Map(
                [
                    ("role".to_string(), Value::Str("user".to_string())),
                    ("content".to_string(), Value::Str("enter tavern".to_string())),
                ]
                .into_iter()
                .collect(),
            )]),
        );
        let result = node.run(vec![item], &ctx());
        assert_eq!(
            result.items[0].get("llm_response"),
            Some(&Value::Str("a story reply".to_string()))
        );
        assert!(result.logs.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_messages_produces_empty_request_not_a_panic() {
        let node = LlmChat {
            model: "flagship".to_string(),
            messages_from: "messages".to_string(),
            response_field: "llm_response".to_string(),
        };
        let result = node.run(vec![Item::new()], &ctx());
        assert_eq!(result.items.len(), 1);
    }
}
