// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interprets the composite node types (Sequence, If, Subflow) and
//! dispatches atomic nodes through the registry. Opens a tracing span
//! around each dispatch and aggregates collaborator errors via `#[from]`.

use crate::context::NodeContext;
use crate::expr::{self, ExprError, Scope};
use crate::registry::{NodeRegistry, RegistryError};
use crate::state_manager::StateManager;
use lw_core::node_result::{merge_logs, merge_metrics, NodeResult};
use lw_core::value::{Item, Items};
use lw_ir::doc::{IrDocument, NodeDef};
use lw_ir::index::{FlowIndex, IndexError};
use lw_ir::validate::{validate_document, ValidationError};
use thiserror::Error;

/// Subflow recursion is capped to prevent infinite nesting.
pub const DEFAULT_MAX_SUBFLOW_DEPTH: u32 = 16;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("flow index error: {0}")]
    Index(#[from] IndexError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("expression error: {0}")]
    Expr(#[from] ExprError),

    #[error("subflow recursion exceeded max depth {0}")]
    MaxDepthExceeded(u32),

    #[error("node {node_id:?} of unknown type {type_name:?}")]
    UnknownNodeType { node_id: String, type_name: String },

    #[error("node {node_id:?} declares type {type_name:?} but carries no matching spec")]
    MalformedNode { node_id: String, type_name: String },
}

/// Result of `validate`: either valid, or the first error encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOutcome {
    pub valid: bool,
    pub error: Option<String>,
}

impl From<Result<(), ValidationError>> for ValidateOutcome {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => ValidateOutcome { valid: true, error: None },
            Err(err) => ValidateOutcome {
                valid: false,
                error: Some(err.to_string()),
            },
        }
    }
}

pub struct Executor<'a> {
    registry: &'a NodeRegistry,
    flows: &'a FlowIndex,
    max_subflow_depth: u32,
}

impl<'a> Executor<'a> {
    pub fn new(registry: &'a NodeRegistry, flows: &'a FlowIndex) -> Self {
        Self {
            registry,
            flows,
            max_subflow_depth: DEFAULT_MAX_SUBFLOW_DEPTH,
        }
    }

    pub fn with_max_subflow_depth(mut self, depth: u32) -> Self {
        self.max_subflow_depth = depth;
        self
    }

    /// Schema + referential check only, no execution.
    pub fn validate(&self, doc: &IrDocument) -> ValidateOutcome {
        validate_document(doc).into()
    }

    /// Resolves `flow_ref` and runs it from its entry node.
    pub fn run(&self, flow_ref: &str, items: Items, ctx: &NodeContext) -> Result<NodeResult, ExecuteError> {
        let doc = self.flows.resolve(flow_ref)?;
        self.run_doc(doc, items, ctx)
    }

    pub fn run_doc(&self, doc: &IrDocument, items: Items, ctx: &NodeContext) -> Result<NodeResult, ExecuteError> {
        self.run_spec(doc, &doc.entry, items, ctx, 0)
    }

    fn run_spec(
        &self,
        doc: &IrDocument,
        node_id: &str,
        items: Items,
        ctx: &NodeContext,
        depth: u32,
    ) -> Result<NodeResult, ExecuteError> {
        self.run_spec_tracking_failure(doc, node_id, items, ctx, depth).map(|(result, _)| result)
    }

    /// Dispatches one node, returning whether it (or the child it reduces
    /// to) failed — used by `Sequence` to decide whether to abort.
    fn run_spec_tracking_failure(
        &self,
        doc: &IrDocument,
        node_id: &str,
        items: Items,
        ctx: &NodeContext,
        depth: u32,
    ) -> Result<(NodeResult, bool), ExecuteError> {
        let node_def = doc.node(node_id).ok_or_else(|| ExecuteError::UnknownNodeType {
            node_id: node_id.to_string(),
            type_name: "<missing>".to_string(),
        })?;

        let _span = ctx.span.enter();

        match node_def.type_name.as_str() {
            "Sequence" => self.run_sequence(doc, node_def, items, ctx, depth),
            "If" => self.run_if(doc, node_def, items, ctx, depth),
            "Subflow" => Ok((self.run_subflow(node_def, items, ctx, depth)?, false)),
            _ => {
                let node = self.registry.construct(node_def)?;
                let (result, failed) = node.safe_run(items, ctx);
                if failed {
                    tracing::warn!(node_id, "node failed during dispatch");
                }
                Ok((result, failed))
            }
        }
    }

    fn run_sequence(
        &self,
        doc: &IrDocument,
        node_def: &NodeDef,
        items: Items,
        ctx: &NodeContext,
        depth: u32,
    ) -> Result<(NodeResult, bool), ExecuteError> {
        let mut current_items = items;
        let mut acc = NodeResult::default();
        let mut failed = false;

        for child_id in node_def.children.as_deref().unwrap_or(&[]) {
            let (result, child_failed) =
                self.run_spec_tracking_failure(doc, child_id, current_items.clone(), ctx, depth)?;
            merge_logs(&mut acc.logs, result.logs.clone());
            merge_metrics(&mut acc.metrics, result.metrics.clone());
            current_items = result.items.clone();
            acc.items = result.items;
            if child_failed {
                failed = true;
                break;
            }
        }

        Ok((acc, failed))
    }

    fn run_if(
        &self,
        doc: &IrDocument,
        node_def: &NodeDef,
        items: Items,
        ctx: &NodeContext,
        depth: u32,
    ) -> Result<(NodeResult, bool), ExecuteError> {
        let if_spec = node_def.if_spec.as_ref().ok_or_else(|| ExecuteError::MalformedNode {
            node_id: node_def.id.clone(),
            type_name: node_def.type_name.clone(),
        })?;
        let state = ctx.state.get_for_prompt();
        let first_item = items.first().cloned().unwrap_or_default();
        let scope = Scope {
            item: &first_item,
            items: &items,
            state: &state,
        };
        let branch = if expr::evaluate_truthy(&if_spec.cond, &scope)? {
            &if_spec.then_ids
        } else {
            &if_spec.else_ids
        };

        self.run_implicit_sequence(doc, branch, items, ctx, depth)
    }

    fn run_implicit_sequence(
        &self,
        doc: &IrDocument,
        child_ids: &[String],
        items: Items,
        ctx: &NodeContext,
        depth: u32,
    ) -> Result<(NodeResult, bool), ExecuteError> {
        let mut current_items = items;
        let mut acc = NodeResult::default();
        let mut failed = false;
        for child_id in child_ids {
            let (result, child_failed) =
                self.run_spec_tracking_failure(doc, child_id, current_items.clone(), ctx, depth)?;
            merge_logs(&mut acc.logs, result.logs.clone());
            merge_metrics(&mut acc.metrics, result.metrics.clone());
            current_items = result.items.clone();
            acc.items = result.items;
            if child_failed {
                failed = true;
                break;
            }
        }
        Ok((acc, failed))
    }

    fn run_subflow(
        &self,
        node_def: &NodeDef,
        items: Items,
        ctx: &NodeContext,
        depth: u32,
    ) -> Result<NodeResult, ExecuteError> {
        if depth + 1 > self.max_subflow_depth {
            return Err(ExecuteError::MaxDepthExceeded(self.max_subflow_depth));
        }
        let spec = node_def.subflow.as_ref().ok_or_else(|| ExecuteError::MalformedNode {
            node_id: node_def.id.clone(),
            type_name: node_def.type_name.clone(),
        })?;
        let child_doc = self.flows.resolve(&spec.flow_ref)?;

        let child_items: Items = items
            .iter()
            .map(|item| {
                let mut child_item = if spec.share_items { item.clone() } else { Item::new() };
                for (source, dest) in &spec.input_map {
                    if let Some(value) = item.get(source) {
                        child_item.set(dest.clone(), value.clone());
                    }
                }
                child_item
            })
            .collect();

        let child_state = if spec.share_state {
            ctx.state.clone()
        } else {
            StateManager::from_lss(ctx.state.snapshot_lss())
        };
        let mut child_ctx = ctx.clone();
        child_ctx.state = child_state;

        let child_result = self.run_spec(child_doc, &child_doc.entry, child_items, &child_ctx, depth + 1)?;

        let merged_items: Items = items
            .into_iter()
            .zip(child_result.items.iter().chain(std::iter::repeat(&Item::new())))
            .map(|(mut parent_item, child_item)| {
                for (child_field, parent_field) in &spec.output_map {
                    if let Some(value) = child_item.get(child_field) {
                        parent_item.set(parent_field.clone(), value.clone());
                    }
                }
                parent_item
            })
            .collect();

        Ok(NodeResult {
            items: merged_items,
            logs: child_result.logs,
            metrics: child_result.metrics,
        })
    }
}
