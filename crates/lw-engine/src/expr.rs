// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The expression language used by `If` conditions and `Map`/`Filter`
//! field expressions: JMESPath, evaluated against a synthesized scope
//! `{item, items, state}`.

use lw_core::value::{Item, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExprError {
    #[error("invalid expression {expr:?}: {source}")]
    Compile {
        expr: String,
        #[source]
        source: jmespath::JmespathError,
    },

    #[error("evaluation of {expr:?} failed: {source}")]
    Search {
        expr: String,
        #[source]
        source: jmespath::JmespathError,
    },
}

/// The scope an expression is evaluated against.
pub struct Scope<'a> {
    pub item: &'a Item,
    pub items: &'a [Item],
    pub state: &'a Item,
}

fn scope_json(scope: &Scope<'_>) -> serde_json::Value {
    serde_json::json!({
        "item": Value::Map(scope.item.0.clone()).to_json(),
        "items": scope.items.iter().map(|i| Value::Map(i.0.clone()).to_json()).collect::<Vec<_>>(),
        "state": Value::Map(scope.state.0.clone()).to_json(),
    })
}

/// Compiles and evaluates a JMESPath expression against `scope`, returning
/// the result as a `Value`.
pub fn evaluate(expr: &str, scope: &Scope<'_>) -> Result<Value, ExprError> {
    let compiled = jmespath::compile(expr).map_err(|source| ExprError::Compile {
        expr: expr.to_string(),
        source,
    })?;
    let data = scope_json(scope);
    let result = compiled.search(&data).map_err(|source| ExprError::Search {
        expr: expr.to_string(),
        source,
    })?;
    let json = serde_json::to_value(result.as_ref()).unwrap_or(serde_json::Value::Null);
    Ok(Value::from_json(json))
}

/// Evaluates `expr` and interprets the result as a boolean predicate using
/// the items bus's truthiness rules.
pub fn evaluate_truthy(expr: &str, scope: &Scope<'_>) -> Result<bool, ExprError> {
    Ok(evaluate(expr, scope)?.is_truthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lw_core::test_support::int_item;

    #[test]
    fn evaluates_field_access_on_item() {
        let item = int_item(&[("turn_count", 3)]);
        let items = vec![item.clone()];
        let state = Item::new();
        let scope = Scope {
            item: &item,
            items: &items,
            state: &state,
        };
        let value = evaluate("item.turn_count", &scope).unwrap();
        assert_eq!(value, Value::Int(3));
    }

    #[test]
    fn evaluates_comparison_as_boolean_predicate() {
        let item = int_item(&[("turn_count", 3)]);
        let items = vec![];
        let state = Item::new();
        let scope = Scope {
            item: &item,
            items: &items,
            state: &state,
        };
        assert!(evaluate_truthy("item.turn_count > `2`", &scope).unwrap());
        assert!(!evaluate_truthy("item.turn_count > `10`", &scope).unwrap());
    }

    #[test]
    fn rejects_malformed_expression() {
        let item = Item::new();
        let items = vec![];
        let state = Item::new();
        let scope = Scope {
            item: &item,
            items: &items,
            state: &state,
        };
        assert!(evaluate("item.[", &scope).is_err());
    }
}
