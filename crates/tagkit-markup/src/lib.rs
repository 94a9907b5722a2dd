//! Markup tree, parser and serializer for tagkit templates.
//!
//! Templates are HTML written in well-formed (XHTML-like) style. This crate
//! parses them into a [`Node`] tree, exposes each element's [`Attributes`]
//! as an ordered, mutable collection, and writes the tree back out.
//!
//! The [`merge`] module adds helpers for composing `class`, `style`,
//! `aria-*` and `data-*` attributes onto an [`Attributes`] collection.
//!
//! # Example
//!
//! ```
//! use tagkit_markup::{parse, serialize};
//!
//! let nodes = parse(r#"<p class="lead">Hello<br>world</p>"#).unwrap();
//! assert_eq!(serialize(&nodes), r#"<p class="lead">Hello<br />world</p>"#);
//! ```

mod attributes;
mod error;
pub mod merge;
mod parser;
mod serializer;
mod tree;

pub use attributes::{AttrValue, Attributes};
pub use error::MarkupError;
pub use parser::{is_void_element, parse};
pub use serializer::{escape_attr, serialize, write_end_tag, write_start_tag};
pub use tree::{Element, Node, line_at};
