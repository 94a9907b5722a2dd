//! Expressions used in directive attributes.
//!
//! Directive attributes such as `condition="User.IsAdmin && !Model.Hidden"`
//! are evaluated against a [`Scope`] through an [`ExpressionEvaluator`].
//! [`StandardEvaluator`] supports:
//!
//! - literals: `true`, `false`, `null`, numbers, `'single'` or `"double"` strings
//! - paths: `Name`, `Name.Field`, `Items[0]`, `Map['key']`; `Model` is the bound model
//! - operators: `!`, `<` `<=` `>` `>=`, `==` `!=`, `&&`, `||`, `cond ? a : b`
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tagkit_renderer::{ExpressionEvaluator, Scope, StandardEvaluator};
//!
//! let scope = Scope::new().with_var("User", json!({"Identity": {"IsAuthenticated": true}}));
//! let evaluator = StandardEvaluator;
//!
//! assert!(evaluator.evaluate_bool("User.Identity.IsAuthenticated", &scope).unwrap());
//! assert!(!evaluator.evaluate_bool("1 == 2", &scope).unwrap());
//! ```

mod lexer;
mod parser;

use serde_json::Value;

use crate::Scope;
use parser::{BinaryOp, Expr, Segment};

/// Error from parsing or evaluating an expression.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string starting at {pos}")]
    UnterminatedString { pos: usize },

    #[error("invalid number '{literal}' at {pos}")]
    InvalidNumber { literal: String, pos: usize },

    #[error("unexpected '{found}' at {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("operator '{op}' cannot be applied to {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("expected boolean, found {found}")]
    NotBoolean { found: &'static str },
}

/// Evaluates directive attribute expressions.
///
/// Implement this to plug in a different expression language.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate an expression to a value.
    fn evaluate(&self, expr: &str, scope: &Scope) -> Result<Value, ExprError>;

    /// Evaluate an expression that must produce a boolean.
    fn evaluate_bool(&self, expr: &str, scope: &Scope) -> Result<bool, ExprError> {
        match self.evaluate(expr, scope)? {
            Value::Bool(b) => Ok(b),
            other => Err(ExprError::NotBoolean {
                found: type_name(&other),
            }),
        }
    }
}

/// Default expression evaluator.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardEvaluator;

impl ExpressionEvaluator for StandardEvaluator {
    fn evaluate(&self, expr: &str, scope: &Scope) -> Result<Value, ExprError> {
        let ast = parser::parse(expr)?;
        eval(&ast, scope)
    }
}

/// JSON type name used in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn eval(expr: &Expr, scope: &Scope) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path { root, segments } => {
            let base = scope
                .lookup(root)
                .ok_or_else(|| ExprError::UndefinedVariable(root.clone()))?;
            Ok(walk(base, segments).cloned().unwrap_or(Value::Null))
        }
        Expr::Not(inner) => Ok(Value::Bool(!as_bool(&eval(inner, scope)?)?)),
        Expr::Binary(BinaryOp::And, left, right) => {
            if !as_bool(&eval(left, scope)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(as_bool(&eval(right, scope)?)?))
        }
        Expr::Binary(BinaryOp::Or, left, right) => {
            if as_bool(&eval(left, scope)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(as_bool(&eval(right, scope)?)?))
        }
        Expr::Binary(op, left, right) => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            compare(*op, &left, &right).map(Value::Bool)
        }
        Expr::Ternary(condition, then, otherwise) => {
            if as_bool(&eval(condition, scope)?)? {
                eval(then, scope)
            } else {
                eval(otherwise, scope)
            }
        }
    }
}

fn walk<'v>(mut value: &'v Value, segments: &[Segment]) -> Option<&'v Value> {
    for segment in segments {
        value = match segment {
            Segment::Field(name) => value.get(name.as_str())?,
            Segment::Index(idx) => value.get(*idx)?,
        };
    }
    Some(value)
}

fn as_bool(value: &Value) -> Result<bool, ExprError> {
    value.as_bool().ok_or(ExprError::NotBoolean {
        found: type_name(value),
    })
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, ExprError> {
    use std::cmp::Ordering;

    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    };

    match op {
        BinaryOp::Eq => Ok(ordering.map_or_else(|| left == right, Ordering::is_eq)),
        BinaryOp::NotEq => Ok(ordering.map_or_else(|| left != right, Ordering::is_ne)),
        _ => {
            let ordering = ordering.ok_or(ExprError::InvalidOperands {
                op: op.symbol(),
                left: type_name(left),
                right: type_name(right),
            })?;
            Ok(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn scope() -> Scope {
        Scope::new()
            .with_var(
                "User",
                json!({"Identity": {"Name": "demo", "IsAuthenticated": true}, "Roles": ["admin"]}),
            )
            .with_var("Count", 3)
            .with_model(json!({"Visible": false, "Title": "Home"}))
    }

    fn eval_bool(expr: &str) -> Result<bool, ExprError> {
        StandardEvaluator.evaluate_bool(expr, &scope())
    }

    #[test]
    fn test_literal_flags() {
        assert_eq!(eval_bool("true"), Ok(true));
        assert_eq!(eval_bool("false"), Ok(false));
    }

    #[test]
    fn test_paths() {
        assert_eq!(eval_bool("User.Identity.IsAuthenticated"), Ok(true));
        assert_eq!(eval_bool("Model.Visible"), Ok(false));
        assert_eq!(eval_bool("User.Roles[0] == 'admin'"), Ok(true));
        assert_eq!(eval_bool("User['Identity'].Name == \"demo\""), Ok(true));
    }

    #[test]
    fn test_missing_member_is_null() {
        assert_eq!(eval_bool("User.Missing == null"), Ok(true));
        assert_eq!(eval_bool("User.Roles[5] == null"), Ok(true));
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            eval_bool("Session.Active"),
            Err(ExprError::UndefinedVariable("Session".to_owned()))
        );
    }

    #[test]
    fn test_logic_and_comparison() {
        assert_eq!(eval_bool("1==1"), Ok(true));
        assert_eq!(eval_bool("Count > 2 && !Model.Visible"), Ok(true));
        assert_eq!(eval_bool("Count >= 4 || Model.Title != 'Home'"), Ok(false));
        assert_eq!(eval_bool("'a' < 'b'"), Ok(true));
        assert_eq!(eval_bool("3 == 3.0"), Ok(true));
    }

    #[test]
    fn test_short_circuit_skips_right_side() {
        assert_eq!(eval_bool("false && Nope.Value"), Ok(false));
        assert_eq!(eval_bool("true || Nope.Value"), Ok(true));
    }

    #[test]
    fn test_ternary() {
        assert_eq!(eval_bool("(Count == 3) ? (true) : (false)"), Ok(true));
        assert_eq!(eval_bool("Model.Visible ? true : Count < 1"), Ok(false));
    }

    #[test]
    fn test_not_boolean() {
        assert_eq!(
            eval_bool("Model.Title"),
            Err(ExprError::NotBoolean { found: "string" })
        );
        assert_eq!(
            eval_bool("!Count"),
            Err(ExprError::NotBoolean { found: "number" })
        );
    }

    #[test]
    fn test_invalid_operands() {
        assert_eq!(
            eval_bool("Count < 'x'"),
            Err(ExprError::InvalidOperands {
                op: "<",
                left: "number",
                right: "string"
            })
        );
    }

    #[test]
    fn test_evaluate_returns_values() {
        let value = StandardEvaluator.evaluate("Model", &scope()).unwrap();
        assert_eq!(value["Title"], json!("Home"));
    }
}
