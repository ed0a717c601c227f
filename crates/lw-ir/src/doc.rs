// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory IR document schema. Both on-disk encodings (tag-delimited
//! HCL, brace-delimited JSON) decode into this same shape.

use indexmap::IndexMap;
use lw_core::value::Value;
use serde::{Deserialize, Serialize};

/// A workflow document: an entry node and the flat list of node
/// definitions it's built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrDocument {
    pub id: String,
    pub version: u32,
    pub entry: String,
    #[serde(alias = "node")]
    pub nodes: Vec<NodeDef>,
    /// Free text, not load-bearing for execution semantics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque, passed through to the debug console.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, Value>,
}

impl IrDocument {
    /// The `id@version` key this document is indexed under.
    pub fn ref_key(&self) -> String {
        format!("{}@{}", self.id, self.version)
    }

    pub fn node(&self, id: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// A single node definition within a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, Value>,
    /// Only meaningful for `type: Sequence`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    /// Only meaningful for `type: If`.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "if")]
    pub if_spec: Option<IfSpec>,
    /// Only meaningful for `type: Subflow`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subflow: Option<SubflowSpec>,
}

/// The branch condition and child id lists for an `If` node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfSpec {
    pub cond: String,
    #[serde(rename = "then")]
    pub then_ids: Vec<String>,
    #[serde(default, rename = "else")]
    pub else_ids: Vec<String>,
}

/// The reference and field mappings for a `Subflow` node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubflowSpec {
    #[serde(rename = "ref")]
    pub flow_ref: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub input_map: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub output_map: IndexMap<String, String>,
    /// Fields not listed in `input_map` pass through only when this is
    /// `true`; default `false` (fresh item with only mapped fields).
    #[serde(default)]
    pub share_items: bool,
    /// Whether the child inherits the parent's `StateManager` (`true`, the
    /// default) or a scratch instance discarded on exit.
    #[serde(default = "default_true")]
    pub share_state: bool,
}

fn default_true() -> bool {
    true
}
