//! Directive processing for markup view templates.
//!
//! Templates are parsed into a node tree with [`tagkit_markup`], then every
//! element is passed through the registered [`directive::TagDirective`]
//! handlers. Directive attributes hold small expressions evaluated against a
//! [`Scope`] of named values and a view model.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use tagkit_renderer::{DirectiveProcessor, Scope};
//! use tagkit_renderer::directive::FsPartialResolver;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("_Footer.html"), "<footer>(c)</footer>").unwrap();
//!
//! let resolver = FsPartialResolver::new(dir.path()).with_extension("html");
//! let processor = DirectiveProcessor::new().with_standard_directives(Arc::new(resolver));
//!
//! let scope = Scope::new().with_model(json!({"Admin": false}));
//! let result = processor
//!     .render(
//!         r#"<main><a condition="Model.Admin">Edit</a></main><partial name="_Footer" />"#,
//!         &scope,
//!     )
//!     .unwrap();
//!
//! assert_eq!(result.html, "<main></main><footer>(c)</footer>");
//! ```

pub mod directive;
mod error;
mod expr;
mod scope;

pub use directive::{DirectiveProcessor, DirectiveProcessorConfig, RenderResult};
pub use error::{DirectiveError, PartialError, RenderError};
pub use expr::{ExprError, ExpressionEvaluator, StandardEvaluator};
pub use scope::{MODEL_VARIABLE, Scope};
