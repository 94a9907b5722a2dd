//! Pluggable tag directives.
//!
//! A directive is a [`TagDirective`] handler that claims elements in a
//! template (by tag name, by attribute, or any other test) and rewrites them
//! through a [`TagOutput`]: renaming or stripping the tag, editing
//! attributes, replacing the content, or suppressing the element entirely.
//!
//! # Built-in directives
//!
//! - [`ConditionDirective`]: `<p condition="expr">` removes the element when
//!   the expression is false
//! - [`IfDirective`]: `<if is="expr">` renders its children without the
//!   wrapping tag, only when the expression is true
//! - [`PartialDirective`]: `<partial name="..." model="expr" />` renders
//!   another template in place
//! - [`ConditionalPartialDirective`]: `<partial-c when="expr" name="..." />`
//!   renders the partial only when `when` is true
//!
//! # Example
//!
//! ```
//! use tagkit_renderer::directive::{DirectiveProcessor, IfDirective};
//! use tagkit_renderer::Scope;
//!
//! let processor = DirectiveProcessor::new().with_directive(IfDirective::default());
//! let scope = Scope::new().with_var("Count", 3);
//!
//! let result = processor
//!     .render(r#"<if is="Count > 2"><b>many</b></if>"#, &scope)
//!     .unwrap();
//! assert_eq!(result.html, "<b>many</b>");
//! ```

mod condition;
mod context;
mod if_tag;
mod output;
mod partial;
mod processor;
mod tag;

pub use condition::{ConditionDirective, DEFAULT_CONDITION_ATTRIBUTE};
pub use context::DirectiveContext;
pub use if_tag::{DEFAULT_IF_TAG, IfDirective};
pub use output::{PartialContent, TagContent, TagOutput};
pub use partial::{
    ConditionalPartialDirective, DEFAULT_CONDITIONAL_PARTIAL_TAG, DEFAULT_PARTIAL_TAG,
    FsPartialResolver, PartialDirective, PartialResolver, ReadFileFn,
};
pub use processor::{DirectiveProcessor, DirectiveProcessorConfig, RenderResult};
pub use tag::TagDirective;
