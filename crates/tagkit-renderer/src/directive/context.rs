//! Directive processing context.
//!
//! Gives directive handlers access to the element being rendered and to the
//! expression evaluator bound to the current scope.

use serde_json::Value;
use tagkit_markup::{AttrValue, Element};

use crate::Scope;
use crate::error::DirectiveError;
use crate::expr::ExpressionEvaluator;

/// Context provided to directive handlers for one element.
///
/// Created by [`DirectiveProcessor`](super::DirectiveProcessor) for each
/// element that has at least one matching directive.
///
/// # Example
///
/// ```
/// use tagkit_markup::Element;
/// use tagkit_renderer::{Scope, StandardEvaluator};
/// use tagkit_renderer::directive::DirectiveContext;
///
/// let scope = Scope::new().with_var("Enabled", false);
/// let element = Element::new("p");
/// let ctx = DirectiveContext {
///     scope: &scope,
///     evaluator: &StandardEvaluator,
///     element: &element,
///     line: 1,
///     partial_depth: 0,
///     max_partial_depth: 10,
/// };
///
/// assert!(!ctx.eval_flag("condition", Some("Enabled"), true).unwrap());
/// assert!(ctx.eval_flag("condition", None, true).unwrap());
/// ```
pub struct DirectiveContext<'a> {
    /// Variables visible to expressions.
    pub scope: &'a Scope,
    /// Evaluator for attribute expressions.
    pub evaluator: &'a dyn ExpressionEvaluator,
    /// The element as written in the template.
    pub element: &'a Element,
    /// Line number of the element's start tag (1-indexed).
    pub line: usize,
    /// Number of partials the element is nested in (0 in the top-level template).
    pub partial_depth: usize,
    /// Deepest partial nesting the processor renders.
    pub max_partial_depth: usize,
}

impl DirectiveContext<'_> {
    /// Evaluate a boolean attribute, using `default` when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::Expression`] if the expression is malformed
    /// or does not produce a boolean.
    pub fn eval_flag(
        &self,
        attribute: &str,
        expr: Option<&str>,
        default: bool,
    ) -> Result<bool, DirectiveError> {
        let Some(expr) = expr else {
            return Ok(default);
        };
        self.evaluator
            .evaluate_bool(expr, self.scope)
            .map_err(|source| DirectiveError::Expression {
                attribute: attribute.to_owned(),
                source,
            })
    }

    /// Evaluate an attribute expression to a value.
    pub fn eval_value(&self, attribute: &str, expr: &str) -> Result<Value, DirectiveError> {
        self.evaluator
            .evaluate(expr, self.scope)
            .map_err(|source| DirectiveError::Expression {
                attribute: attribute.to_owned(),
                source,
            })
    }

    /// Whether including another partial here would exceed the nesting limit.
    #[must_use]
    pub fn partial_limit_reached(&self) -> bool {
        self.partial_depth >= self.max_partial_depth
    }

    /// Evaluate a flag taken from the output attributes.
    pub(crate) fn eval_flag_attr(
        &self,
        attribute: &str,
        value: Option<&AttrValue>,
        default: bool,
    ) -> Result<bool, DirectiveError> {
        self.eval_flag(attribute, value.map(AttrValue::as_str), default)
    }
}
