// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A node's output: the items it produced, what it logged, and what it
//! measured. The executor concatenates logs and merges metrics across a
//! chain of nodes per the rule in [`merge_metrics`].

use crate::value::{Items, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single metric value: either a number (summable on merge) or an
/// arbitrary value (last-write-wins on merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Other(Value),
}

impl MetricValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Other(_) => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        MetricValue::Number(n)
    }
}

impl From<u64> for MetricValue {
    fn from(n: u64) -> Self {
        MetricValue::Number(n as f64)
    }
}

pub type Metrics = IndexMap<String, MetricValue>;

/// What a node (or a chain of nodes) produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub items: Items,
    pub logs: Vec<String>,
    pub metrics: Metrics,
}

impl NodeResult {
    pub fn new(items: Items) -> Self {
        Self {
            items,
            logs: Vec::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn log(mut self, line: impl Into<String>) -> Self {
        self.logs.push(line.into());
        self
    }

    pub fn metric(mut self, key: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }
}

/// Logs always accumulate, in the order the contributing nodes ran.
pub fn merge_logs(into: &mut Vec<String>, from: Vec<String>) {
    into.extend(from);
}

/// On key collision: if both sides are numeric, sum; otherwise the later
/// value wins. Keys present only on one side pass through unchanged.
pub fn merge_metrics(into: &mut Metrics, from: Metrics) {
    for (key, value) in from {
        match into.get(&key) {
            Some(existing) => {
                let merged = match (existing.as_number(), value.as_number()) {
                    (Some(a), Some(b)) => MetricValue::Number(a + b),
                    _ => value,
                };
                into.insert(key, merged);
            }
            None => {
                into.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_metrics_sums_numeric_collisions() {
        let mut into = Metrics::new();
        into.insert("calls".to_string(), MetricValue::Number(2.0));
        let mut from = Metrics::new();
        from.insert("calls".to_string(), MetricValue::Number(3.0));
        merge_metrics(&mut into, from);
        assert_eq!(into.get("calls"), Some(&MetricValue::Number(5.0)));
    }

    #[test]
    fn merge_metrics_last_write_wins_for_non_numeric() {
        let mut into = Metrics::new();
        into.insert("model".to_string(), MetricValue::Other(Value::Str("a".into())));
        let mut from = Metrics::new();
        from.insert("model".to_string(), MetricValue::Other(Value::Str("b".into())));
        merge_metrics(&mut into, from);
        assert_eq!(
            into.get("model"),
            Some(&MetricValue::Other(Value::Str("b".into())))
        );
    }

    #[test]
    fn merge_metrics_keeps_keys_unique_to_either_side() {
        let mut into = Metrics::new();
        into.insert("a".to_string(), MetricValue::Number(1.0));
        let mut from = Metrics::new();
        from.insert("b".to_string(), MetricValue::Number(2.0));
        merge_metrics(&mut into, from);
        assert_eq!(into.len(), 2);
    }

    #[test]
    fn merge_logs_preserves_order() {
        let mut into = vec!["first".to_string()];
        merge_logs(&mut into, vec!["second".to_string(), "third".to_string()]);
        assert_eq!(into, vec!["first", "second", "third"]);
    }
}
