//! Error types for template rendering.

use std::path::PathBuf;

use tagkit_markup::MarkupError;

use crate::expr::ExprError;

/// Error resolving a partial template.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PartialError {
    /// No template exists under the given name.
    #[error("partial not found: {0}")]
    NotFound(String),

    /// The name resolves to a path outside the partials root.
    #[error("partial path escapes the partials root: {0}")]
    OutsideRoot(String),

    /// Reading the template failed.
    #[error("failed to read partial {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error raised by a directive while processing one element.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DirectiveError {
    /// An attribute expression could not be evaluated.
    #[error("invalid expression in '{attribute}': {source}")]
    Expression {
        attribute: String,
        #[source]
        source: ExprError,
    },

    /// A required attribute is missing.
    #[error("missing required attribute '{0}'")]
    MissingAttribute(String),

    /// The partial could not be resolved.
    #[error("cannot include partial '{name}': {source}")]
    Partial {
        name: String,
        #[source]
        source: PartialError,
    },
}

/// Error that aborts a render.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The template markup could not be parsed.
    #[error("{0}")]
    Markup(#[from] MarkupError),

    /// A directive failed on an element.
    #[error("line {line}: <{element}> ({directive}): {source}")]
    Directive {
        directive: String,
        element: String,
        line: usize,
        #[source]
        source: DirectiveError,
    },

    /// Rendering an included partial failed.
    #[error("in partial '{name}': {source}")]
    InPartial {
        name: String,
        #[source]
        source: Box<RenderError>,
    },
}
