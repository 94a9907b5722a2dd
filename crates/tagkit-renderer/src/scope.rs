//! Variables visible to directive expressions.

use serde_json::{Map, Value};

/// Name under which the bound model is visible to expressions.
pub const MODEL_VARIABLE: &str = "Model";

/// Read-only data that directive expressions are evaluated against.
///
/// A scope holds named variables plus the current model. Partials rendered
/// with a `model` attribute see the same variables with the model replaced.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tagkit_renderer::Scope;
///
/// let scope = Scope::new()
///     .with_var("Year", 2021)
///     .with_model(json!({"Title": "Home"}));
///
/// assert_eq!(scope.lookup("Year"), Some(&json!(2021)));
/// assert_eq!(scope.lookup("Model").unwrap()["Title"], json!("Home"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
    vars: Map<String, Value>,
    model: Value,
}

impl Scope {
    /// Create an empty scope with a `null` model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_var(name, value);
        self
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<Value>) -> Self {
        self.model = model.into();
        self
    }

    /// Add or replace a variable.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn model(&self) -> &Value {
        &self.model
    }

    /// Resolve the first segment of an expression path.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        if name == MODEL_VARIABLE {
            return Some(&self.model);
        }
        self.vars.get(name)
    }

    /// Scope with the same variables and a different model.
    #[must_use]
    pub fn with_bound_model(&self, model: Value) -> Self {
        Self {
            vars: self.vars.clone(),
            model,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_lookup_model_and_vars() {
        let scope = Scope::new().with_var("A", true).with_model(json!([1, 2]));
        assert_eq!(scope.lookup("A"), Some(&json!(true)));
        assert_eq!(scope.lookup("Model"), Some(&json!([1, 2])));
        assert_eq!(scope.lookup("B"), None);
    }

    #[test]
    fn test_default_model_is_null() {
        assert_eq!(Scope::new().model(), &Value::Null);
    }

    #[test]
    fn test_bound_model_keeps_vars() {
        let parent = Scope::new().with_var("A", 1).with_model(json!("parent"));
        let child = parent.with_bound_model(json!("child"));

        assert_eq!(child.lookup("A"), Some(&json!(1)));
        assert_eq!(child.model(), &json!("child"));
        assert_eq!(parent.model(), &json!("parent"));
    }

    #[test]
    fn test_variable_named_model_is_shadowed() {
        let scope = Scope::new().with_var("Model", 1).with_model(json!(2));
        assert_eq!(scope.lookup("Model"), Some(&json!(2)));
    }
}
