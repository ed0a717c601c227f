// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema and referential validation for a parsed [`IrDocument`].

use crate::doc::IrDocument;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("version must be >= 1")]
    InvalidVersion,

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("entry not found")]
    EntryNotFound,

    #[error("node {node} references unknown child id: {child}")]
    UnknownChild { node: String, child: String },

    #[error("node {node} has an if.then/else entry referencing unknown id: {id}")]
    UnknownIfBranchTarget { node: String, id: String },

    #[error("node {node} has a malformed subflow.ref (expected id@version): {flow_ref}")]
    MalformedSubflowRef { node: String, flow_ref: String },
}

/// Validates schema conformance and referential integrity; does not
/// resolve `subflow.ref` targets (those are resolved lazily at execution
/// time).
pub fn validate_document(doc: &IrDocument) -> Result<(), ValidationError> {
    if doc.version < 1 {
        return Err(ValidationError::InvalidVersion);
    }

    let mut seen = HashSet::new();
    for node in &doc.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(ValidationError::DuplicateNodeId(node.id.clone()));
        }
    }

    if !seen.contains(doc.entry.as_str()) {
        return Err(ValidationError::EntryNotFound);
    }

    for node in &doc.nodes {
        if let Some(children) = &node.children {
            for child in children {
                if !seen.contains(child.as_str()) {
                    return Err(ValidationError::UnknownChild {
                        node: node.id.clone(),
                        child: child.clone(),
                    });
                }
            }
        }

        if let Some(if_spec) = &node.if_spec {
            for id in if_spec.then_ids.iter().chain(if_spec.else_ids.iter()) {
                if !seen.contains(id.as_str()) {
                    return Err(ValidationError::UnknownIfBranchTarget {
                        node: node.id.clone(),
                        id: id.clone(),
                    });
                }
            }
        }

        if let Some(subflow) = &node.subflow {
            if !is_id_at_version(&subflow.flow_ref) {
                return Err(ValidationError::MalformedSubflowRef {
                    node: node.id.clone(),
                    flow_ref: subflow.flow_ref.clone(),
                });
            }
        }
    }

    Ok(())
}

fn is_id_at_version(flow_ref: &str) -> bool {
    match flow_ref.split_once('@') {
        Some((id, version)) => !id.is_empty() && version.parse::<u32>().is_ok(),
        None => false,
    }
}
