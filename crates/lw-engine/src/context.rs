// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `NodeContext`: the runtime object threaded through every node
//! invocation. Built fresh per IR run; never stored in a hidden global.

use crate::state_manager::StateManager;
use lw_adapters::LlmAdapter;
use lw_core::value::Items;
use lw_core::{BranchId, SessionId};
use std::collections::HashMap;
use std::sync::Arc;

/// A whitelisted function a `Code` node may invoke.
pub type CodeFn = Arc<dyn Fn(Items, &NodeContext) -> Result<Items, String> + Send + Sync>;

/// Shared services available to nodes: the LLM adapter and the whitelist
/// of callable code functions.
#[derive(Clone)]
pub struct Resources {
    pub llm: Arc<dyn LlmAdapter>,
    pub code_funcs: HashMap<String, CodeFn>,
    /// Lets the (synchronous) `LLMChat` node block on the adapter's async
    /// call without every node needing an async signature.
    pub rt: tokio::runtime::Handle,
}

impl Resources {
    pub fn new(llm: Arc<dyn LlmAdapter>, rt: tokio::runtime::Handle) -> Self {
        Self {
            llm,
            code_funcs: HashMap::new(),
            rt,
        }
    }

    pub fn with_code_fn(mut self, name: impl Into<String>, f: CodeFn) -> Self {
        self.code_funcs.insert(name.into(), f);
        self
    }
}

/// Carries the identity of the round being executed, the state manager
/// handle, the resource bag, and the tracing span nodes log under.
#[derive(Clone)]
pub struct NodeContext {
    pub session_id: SessionId,
    pub branch_id: BranchId,
    pub round_no: u64,
    pub state: StateManager,
    pub resources: Resources,
    pub span: tracing::Span,
}

impl NodeContext {
    pub fn new(
        session_id: SessionId,
        branch_id: BranchId,
        round_no: u64,
        state: StateManager,
        resources: Resources,
    ) -> Self {
        let span = tracing::info_span!(
            "round",
            session_id = %session_id,
            branch_id = %branch_id,
            round_no,
        );
        Self {
            session_id,
            branch_id,
            round_no,
            state,
            resources,
            span,
        }
    }
}
