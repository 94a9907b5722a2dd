//! Conditional-content directive: `<if is="expr">...</if>`.

use tagkit_markup::Element;

use super::{DirectiveContext, TagDirective, TagOutput};
use crate::error::DirectiveError;

/// Default tag name for [`IfDirective`].
pub const DEFAULT_IF_TAG: &str = "if";

/// Attribute holding the condition.
const IS_ATTRIBUTE: &str = "is";

/// Renders its children only when `is` evaluates to true.
///
/// The wrapping tag itself is always stripped. `is` defaults to true when
/// omitted. Runs before every other directive on the same element.
///
/// ```html
/// <if is="Model.Items[0] != null"><p>First item</p></if>
/// ```
#[derive(Debug)]
pub struct IfDirective {
    tag: String,
}

impl Default for IfDirective {
    fn default() -> Self {
        Self::new(DEFAULT_IF_TAG)
    }
}

impl IfDirective {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl TagDirective for IfDirective {
    fn name(&self) -> &'static str {
        "if"
    }

    fn matches(&self, element: &Element) -> bool {
        element.is(&self.tag)
    }

    fn order(&self) -> i32 {
        i32::MIN
    }

    fn process(
        &self,
        ctx: &DirectiveContext,
        output: &mut TagOutput,
    ) -> Result<(), DirectiveError> {
        output.strip_tag();

        let value = output.take_attribute(IS_ATTRIBUTE);
        if !ctx.eval_flag_attr(IS_ATTRIBUTE, value.as_ref(), true)? {
            tracing::debug!(line = ctx.line, "if condition false, suppressing content");
            output.suppress_output();
        }
        Ok(())
    }
}
