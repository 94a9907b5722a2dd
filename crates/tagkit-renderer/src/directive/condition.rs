//! Conditional-visibility directive: `<p condition="expr">`.

use tagkit_markup::Element;

use super::{DirectiveContext, TagDirective, TagOutput};
use crate::error::DirectiveError;

/// Default attribute name for [`ConditionDirective`].
pub const DEFAULT_CONDITION_ATTRIBUTE: &str = "condition";

/// Suppresses any element whose condition attribute evaluates to false.
///
/// Applies to every element carrying the attribute. When the condition is
/// true the element renders unchanged apart from the attribute itself.
///
/// ```html
/// <header condition="User.Identity.IsAuthenticated" class="navbar">...</header>
/// ```
#[derive(Debug)]
pub struct ConditionDirective {
    attribute: String,
}

impl Default for ConditionDirective {
    fn default() -> Self {
        Self::new(DEFAULT_CONDITION_ATTRIBUTE)
    }
}

impl ConditionDirective {
    #[must_use]
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }
}

impl TagDirective for ConditionDirective {
    fn name(&self) -> &'static str {
        "condition"
    }

    fn matches(&self, element: &Element) -> bool {
        element.attrs.contains(&self.attribute)
    }

    fn process(
        &self,
        ctx: &DirectiveContext,
        output: &mut TagOutput,
    ) -> Result<(), DirectiveError> {
        let value = output.take_attribute(&self.attribute);
        if !ctx.eval_flag_attr(&self.attribute, value.as_ref(), true)? {
            tracing::debug!(element = %ctx.element.name, line = ctx.line, "condition false, suppressing element");
            output.suppress_output();
        }
        Ok(())
    }
}
