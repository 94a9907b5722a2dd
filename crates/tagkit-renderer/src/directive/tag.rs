//! Tag directive trait.

use tagkit_markup::Element;

use super::{DirectiveContext, TagOutput};
use crate::error::DirectiveError;

/// Handler invoked for every element it matches.
///
/// The processor collects all directives whose [`matches`](Self::matches)
/// returns true for an element and runs them in ascending
/// [`order`](Self::order), ties broken by registration order. Once a
/// directive suppresses the output, the remaining ones are skipped.
///
/// # Thread Safety
///
/// Handlers are `Send + Sync` and take `&self`, so one processor can render
/// several templates concurrently.
///
/// # Example
///
/// ```
/// use tagkit_markup::Element;
/// use tagkit_renderer::directive::{DirectiveContext, TagDirective, TagOutput};
/// use tagkit_renderer::DirectiveError;
///
/// /// Adds `rel="noopener"` to links that open a new window.
/// struct NoOpener;
///
/// impl TagDirective for NoOpener {
///     fn name(&self) -> &str { "noopener" }
///
///     fn matches(&self, element: &Element) -> bool {
///         element.is("a") && element.attrs.get_str("target") == Some("_blank")
///     }
///
///     fn process(&self, _ctx: &DirectiveContext, output: &mut TagOutput) -> Result<(), DirectiveError> {
///         output.attributes.set("rel", "noopener");
///         Ok(())
///     }
/// }
/// ```
pub trait TagDirective: Send + Sync {
    /// Directive name used in diagnostics.
    fn name(&self) -> &str;

    /// Whether this directive applies to the element.
    fn matches(&self, element: &Element) -> bool;

    /// Relative run order among directives on the same element. Lower runs first.
    fn order(&self) -> i32 {
        0
    }

    /// Process the element, mutating its output.
    fn process(&self, ctx: &DirectiveContext, output: &mut TagOutput)
    -> Result<(), DirectiveError>;
}
