//! Directive processor for markup templates.
//!
//! Parses a template, runs the registered directives on every element they
//! match, and writes the resulting markup.

use std::sync::Arc;

use tagkit_markup::{Element, Node, line_at, parse, write_end_tag, write_start_tag};

use super::{
    ConditionDirective, ConditionalPartialDirective, DEFAULT_CONDITIONAL_PARTIAL_TAG,
    DEFAULT_PARTIAL_TAG, DirectiveContext, IfDirective, PartialContent, PartialDirective,
    PartialResolver, TagContent, TagDirective, TagOutput,
};
use crate::Scope;
use crate::error::RenderError;
use crate::expr::{ExpressionEvaluator, StandardEvaluator};

/// Configuration for the directive processor.
pub struct DirectiveProcessorConfig {
    /// Maximum partial nesting depth to prevent infinite recursion.
    ///
    /// Default: 10
    pub max_partial_depth: usize,
    /// Expression evaluator for directive attributes.
    ///
    /// Default: [`StandardEvaluator`]
    pub evaluator: Option<Box<dyn ExpressionEvaluator>>,
}

impl Default for DirectiveProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveProcessorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_partial_depth: 10,
            evaluator: None,
        }
    }

    /// Set the maximum partial nesting depth.
    #[must_use]
    pub fn with_max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = depth;
        self
    }

    /// Set the expression evaluator.
    #[must_use]
    pub fn with_evaluator<E: ExpressionEvaluator + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }
}

/// Result of rendering a template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered markup.
    pub html: String,
    /// Warnings generated during rendering (e.g., partial nesting too deep).
    pub warnings: Vec<String>,
}

/// Processor for markup directives.
///
/// Holds a registry of [`TagDirective`] handlers. For every element in a
/// template, the handlers that match it run in ascending order against a
/// [`TagOutput`]; elements with no matching handler are written unchanged.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tagkit_renderer::{DirectiveProcessor, PartialError, Scope};
/// use tagkit_renderer::directive::PartialResolver;
///
/// let resolver: Arc<dyn PartialResolver> =
///     Arc::new(|name: &str| -> Result<String, PartialError> { Ok(format!("<nav>{name}</nav>")) });
/// let processor = DirectiveProcessor::new().with_standard_directives(resolver);
///
/// let scope = Scope::new().with_var("LoggedIn", false);
/// let result = processor
///     .render(
///         r#"<p condition="LoggedIn">Welcome</p><if is="!LoggedIn"><a href="/login">Log in</a></if><partial-c when="true" name="menu" />"#,
///         &scope,
///     )
///     .unwrap();
///
/// assert_eq!(result.html, r#"<a href="/login">Log in</a><nav>menu</nav>"#);
/// ```
pub struct DirectiveProcessor {
    config: DirectiveProcessorConfig,
    evaluator: Box<dyn ExpressionEvaluator>,
    directives: Vec<Box<dyn TagDirective>>,
}

impl Default for DirectiveProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveProcessor {
    /// Create a new directive processor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DirectiveProcessorConfig::default())
    }

    /// Create a new directive processor with custom configuration.
    #[must_use]
    pub fn with_config(mut config: DirectiveProcessorConfig) -> Self {
        let evaluator = config
            .evaluator
            .take()
            .unwrap_or_else(|| Box::new(StandardEvaluator));
        Self {
            config,
            evaluator,
            directives: Vec::new(),
        }
    }

    /// Register a directive handler.
    #[must_use]
    pub fn with_directive<D: TagDirective + 'static>(mut self, directive: D) -> Self {
        self.directives.push(Box::new(directive));
        self
    }

    /// Register the built-in directives under their default names:
    /// `condition`, `<if>`, `<partial>` and `<partial-c>`.
    #[must_use]
    pub fn with_standard_directives(self, resolver: Arc<dyn PartialResolver>) -> Self {
        self.with_directive(ConditionDirective::default())
            .with_directive(IfDirective::default())
            .with_directive(PartialDirective::new(
                DEFAULT_PARTIAL_TAG,
                Arc::clone(&resolver),
            ))
            .with_directive(ConditionalPartialDirective::new(
                DEFAULT_CONDITIONAL_PARTIAL_TAG,
                resolver,
            ))
    }

    /// Number of registered directives.
    #[must_use]
    pub fn directive_count(&self) -> usize {
        self.directives.len()
    }

    /// Parse and render a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be parsed, a directive
    /// expression is invalid, or a partial cannot be resolved.
    pub fn render(&self, template: &str, scope: &Scope) -> Result<RenderResult, RenderError> {
        let nodes = parse(template)?;
        let mut pass = RenderPass {
            processor: self,
            warnings: Vec::new(),
        };

        let mut html = String::with_capacity(template.len());
        pass.render_nodes(&nodes, template, scope, 0, &mut html)?;

        Ok(RenderResult {
            html,
            warnings: pass.warnings,
        })
    }
}

/// State of a single render call.
struct RenderPass<'p> {
    processor: &'p DirectiveProcessor,
    warnings: Vec<String>,
}

impl RenderPass<'_> {
    fn render_nodes(
        &mut self,
        nodes: &[Node],
        source: &str,
        scope: &Scope,
        depth: usize,
        out: &mut String,
    ) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Element(el) => self.render_element(el, source, scope, depth, out)?,
                Node::Text(text) | Node::Verbatim(text) => out.push_str(text),
                Node::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
            }
        }
        Ok(())
    }

    fn render_element(
        &mut self,
        el: &Element,
        source: &str,
        scope: &Scope,
        depth: usize,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let mut matched: Vec<&dyn TagDirective> = self
            .processor
            .directives
            .iter()
            .filter(|d| d.matches(el))
            .map(AsRef::as_ref)
            .collect();

        if matched.is_empty() {
            let self_closing = el.self_closing && el.children.is_empty();
            write_start_tag(out, &el.name, &el.attrs, self_closing);
            if !self_closing {
                self.render_nodes(&el.children, source, scope, depth, out)?;
                write_end_tag(out, &el.name);
            }
            return Ok(());
        }

        // Stable sort keeps registration order for equal `order()` values.
        matched.sort_by_key(|d| d.order());

        let line = line_at(source, el.offset);
        let ctx = DirectiveContext {
            scope,
            evaluator: self.processor.evaluator.as_ref(),
            element: el,
            line,
            partial_depth: depth,
            max_partial_depth: self.processor.config.max_partial_depth,
        };

        let mut output = TagOutput::from_element(el);
        for directive in matched {
            if output.is_suppressed() {
                tracing::trace!(directive = directive.name(), line, "Skipping directive on suppressed element");
                continue;
            }
            directive
                .process(&ctx, &mut output)
                .map_err(|source| RenderError::Directive {
                    directive: directive.name().to_owned(),
                    element: el.name.clone(),
                    line,
                    source,
                })?;
        }
        self.warnings.extend(output.take_warnings());

        if output.is_suppressed() {
            return Ok(());
        }
        self.write_output(el, output, source, scope, depth, out)
    }

    fn write_output(
        &mut self,
        el: &Element,
        output: TagOutput,
        source: &str,
        scope: &Scope,
        depth: usize,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let (tag_name, attrs, content, self_closing) = output.into_parts();
        let self_closing = self_closing
            && matches!(content, TagContent::Children)
            && el.children.is_empty();

        if let Some(name) = &tag_name {
            write_start_tag(out, name, &attrs, self_closing);
            if self_closing {
                return Ok(());
            }
        }

        match content {
            TagContent::Children => self.render_nodes(&el.children, source, scope, depth, out)?,
            TagContent::Html(html) => out.push_str(&html),
            TagContent::Partial(partial) => self.render_partial(partial, scope, depth, out)?,
        }

        if let Some(name) = &tag_name {
            write_end_tag(out, name);
        }
        Ok(())
    }

    fn render_partial(
        &mut self,
        partial: PartialContent,
        scope: &Scope,
        depth: usize,
        out: &mut String,
    ) -> Result<(), RenderError> {
        // Partials set by custom directives bypass the check in `PartialDirective`.
        let max_depth = self.processor.config.max_partial_depth;
        if depth >= max_depth {
            tracing::warn!(partial = %partial.name, max_depth, "Partial nesting too deep");
            self.warnings.push(format!(
                "partial '{}' not rendered: maximum partial depth ({max_depth}) exceeded",
                partial.name
            ));
            return Ok(());
        }

        let PartialContent {
            name,
            source,
            model,
        } = partial;
        let in_partial = |err: RenderError| RenderError::InPartial {
            name: name.clone(),
            source: Box::new(err),
        };

        let nodes = parse(&source).map_err(|e| in_partial(e.into()))?;
        let bound;
        let scope = match model {
            Some(model) => {
                bound = scope.with_bound_model(model);
                &bound
            }
            None => scope,
        };

        self.render_nodes(&nodes, &source, scope, depth + 1, out)
            .map_err(in_partial)
    }
}
