//! Partial inclusion directives.
//!
//! - [`PartialDirective`]: `<partial name="..." model="..." />` always includes
//!   the named template.
//! - [`ConditionalPartialDirective`]: `<partial-c when="..." name="..." />`
//!   includes it only when `when` is true, and never touches the resolver
//!   otherwise.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tagkit_markup::Element;

use super::{DirectiveContext, PartialContent, TagContent, TagDirective, TagOutput};
use crate::error::{DirectiveError, PartialError};

/// Default tag name for [`PartialDirective`].
pub const DEFAULT_PARTIAL_TAG: &str = "partial";

/// Default tag name for [`ConditionalPartialDirective`].
pub const DEFAULT_CONDITIONAL_PARTIAL_TAG: &str = "partial-c";

const NAME_ATTRIBUTE: &str = "name";
const MODEL_ATTRIBUTE: &str = "model";
const WHEN_ATTRIBUTE: &str = "when";

/// Looks up partial template sources by name.
///
/// Closures `Fn(&str) -> Result<String, PartialError>` implement this trait.
pub trait PartialResolver: Send + Sync {
    /// Return the template source for `name`.
    fn resolve(&self, name: &str) -> Result<String, PartialError>;
}

impl<F> PartialResolver for F
where
    F: Fn(&str) -> Result<String, PartialError> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Result<String, PartialError> {
        self(name)
    }
}

/// Type alias for the file reading callback function.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send + Sync;

/// Resolves partials from files under a root directory.
///
/// Names are relative to the root; a leading `/` or `~/` is ignored. When the
/// name has no extension, the configured default extension is appended.
/// Names that resolve outside the root are rejected.
///
/// # Example
///
/// ```
/// use tagkit_renderer::directive::{FsPartialResolver, PartialResolver};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("_header.html"), "<header>Hi</header>").unwrap();
///
/// let resolver = FsPartialResolver::new(dir.path()).with_extension("html");
/// assert_eq!(resolver.resolve("/_header").unwrap(), "<header>Hi</header>");
/// assert!(resolver.resolve("../outside.html").is_err());
/// ```
pub struct FsPartialResolver {
    root: PathBuf,
    extension: Option<String>,
    read_file: Box<ReadFileFn>,
}

impl FsPartialResolver {
    /// Create a resolver reading from `root` with `std::fs::read_to_string`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: None,
            read_file: Box::new(|path| std::fs::read_to_string(path)),
        }
    }

    /// Set the extension appended to names without one.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + Sync + 'static,
    {
        self.read_file = Box::new(read_file);
        self
    }

    /// Map a partial name to a path under the root.
    ///
    /// Canonicalizes the result and requires it to stay within the root.
    fn locate(&self, name: &str) -> Result<PathBuf, PartialError> {
        let relative = name.trim();
        let relative = relative
            .strip_prefix("~/")
            .unwrap_or(relative)
            .trim_start_matches('/');
        if relative.is_empty() {
            return Err(PartialError::NotFound(name.to_owned()));
        }

        let mut path = self.root.join(relative);
        if path.extension().is_none()
            && let Some(ext) = &self.extension
        {
            path.set_extension(ext);
        }

        let canonical = path
            .canonicalize()
            .map_err(|_| PartialError::NotFound(name.to_owned()))?;
        let canonical_root = self.root.canonicalize().map_err(|source| PartialError::Io {
            path: self.root.clone(),
            source,
        })?;

        if canonical.starts_with(&canonical_root) {
            Ok(canonical)
        } else {
            Err(PartialError::OutsideRoot(name.to_owned()))
        }
    }
}

impl PartialResolver for FsPartialResolver {
    fn resolve(&self, name: &str) -> Result<String, PartialError> {
        let path = self.locate(name)?;
        (self.read_file)(&path).map_err(|source| PartialError::Io { path, source })
    }
}

/// Includes a partial template in place of the tag.
///
/// `name` is required. `model` is an expression whose value becomes `Model`
/// inside the partial; without it the partial sees the current model.
/// Resolution errors propagate unchanged.
pub struct PartialDirective {
    tag: String,
    resolver: Arc<dyn PartialResolver>,
}

impl PartialDirective {
    #[must_use]
    pub fn new(tag: impl Into<String>, resolver: Arc<dyn PartialResolver>) -> Self {
        Self {
            tag: tag.into(),
            resolver,
        }
    }

    /// Resolve the partial named on the element and set it as content.
    fn include(&self, ctx: &DirectiveContext, output: &mut TagOutput) -> Result<(), DirectiveError> {
        let name = output
            .take_attribute(NAME_ATTRIBUTE)
            .map(|v| v.as_str().to_owned())
            .ok_or_else(|| DirectiveError::MissingAttribute(NAME_ATTRIBUTE.to_owned()))?;

        if ctx.partial_limit_reached() {
            tracing::warn!(partial = %name, max_depth = ctx.max_partial_depth, "Partial nesting too deep");
            output.add_warning(format!(
                "partial '{name}' not rendered: maximum partial depth ({}) exceeded",
                ctx.max_partial_depth
            ));
            output.suppress_output();
            return Ok(());
        }

        let model = match output.take_attribute(MODEL_ATTRIBUTE) {
            Some(expr) => Some(ctx.eval_value(MODEL_ATTRIBUTE, expr.as_str())?),
            None => None,
        };

        let source = self
            .resolver
            .resolve(&name)
            .map_err(|source| DirectiveError::Partial {
                name: name.clone(),
                source,
            })?;
        tracing::debug!(partial = %name, line = ctx.line, "Resolved partial");

        output.strip_tag();
        output.attributes.clear();
        output.set_content(TagContent::Partial(PartialContent {
            name,
            source,
            model,
        }));
        Ok(())
    }
}

impl TagDirective for PartialDirective {
    fn name(&self) -> &'static str {
        "partial"
    }

    fn matches(&self, element: &Element) -> bool {
        element.is(&self.tag)
    }

    fn process(
        &self,
        ctx: &DirectiveContext,
        output: &mut TagOutput,
    ) -> Result<(), DirectiveError> {
        self.include(ctx, output)
    }
}

/// Partial inclusion gated by a `when` flag (default true).
///
/// When the flag is false nothing is rendered and the resolver is not called.
pub struct ConditionalPartialDirective {
    tag: String,
    inner: PartialDirective,
}

impl ConditionalPartialDirective {
    #[must_use]
    pub fn new(tag: impl Into<String>, resolver: Arc<dyn PartialResolver>) -> Self {
        let tag = tag.into();
        Self {
            inner: PartialDirective::new(tag.clone(), resolver),
            tag,
        }
    }
}

impl TagDirective for ConditionalPartialDirective {
    fn name(&self) -> &'static str {
        "conditional-partial"
    }

    fn matches(&self, element: &Element) -> bool {
        element.is(&self.tag)
    }

    fn process(
        &self,
        ctx: &DirectiveContext,
        output: &mut TagOutput,
    ) -> Result<(), DirectiveError> {
        let when = output.take_attribute(WHEN_ATTRIBUTE);
        if !ctx.eval_flag_attr(WHEN_ATTRIBUTE, when.as_ref(), true)? {
            tracing::debug!(line = ctx.line, "when false, skipping partial");
            output.suppress_output();
            return Ok(());
        }
        self.inner.include(ctx, output)
    }
}
