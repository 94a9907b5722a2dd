//! Per-element output that directives mutate.

use serde_json::Value;
use tagkit_markup::{AttrValue, Attributes, Element};

/// What is rendered between the start and end tags.
#[derive(Clone, Debug, PartialEq)]
pub enum TagContent {
    /// The element's children from the template.
    Children,
    /// Markup written verbatim.
    Html(String),
    /// A resolved partial template, rendered in place.
    Partial(PartialContent),
}

/// Partial template source ready to be rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialContent {
    /// Name the partial was requested by.
    pub name: String,
    /// Template source returned by the resolver.
    pub source: String,
    /// Model to bind, or `None` to inherit the current model.
    pub model: Option<Value>,
}

/// Output of one element, built from the template and mutated by directives.
///
/// Starts as a copy of the element's tag name and attributes with
/// [`TagContent::Children`] as content.
///
/// # Example
///
/// ```
/// use tagkit_markup::{Attributes, Element};
/// use tagkit_renderer::directive::TagOutput;
///
/// let attrs: Attributes = [("condition", "false"), ("class", "x")].into_iter().collect();
/// let mut output = TagOutput::from_element(&Element::new("p").with_attrs(attrs));
///
/// assert!(output.take_attribute("condition").is_some());
/// output.attributes.add_css_class("y");
/// assert_eq!(output.attributes.get_str("class"), Some("x y"));
///
/// output.suppress_output();
/// assert!(output.is_suppressed());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TagOutput {
    tag_name: Option<String>,
    /// Attributes written on the start tag.
    pub attributes: Attributes,
    content: TagContent,
    self_closing: bool,
    suppressed: bool,
    warnings: Vec<String>,
}

impl TagOutput {
    /// Output that renders `element` unchanged.
    #[must_use]
    pub fn from_element(element: &Element) -> Self {
        Self {
            tag_name: Some(element.name.clone()),
            attributes: element.attrs.clone(),
            content: TagContent::Children,
            self_closing: element.self_closing,
            suppressed: false,
            warnings: Vec::new(),
        }
    }

    /// Tag name, or `None` when the tag has been stripped.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    pub fn set_tag_name(&mut self, name: impl Into<String>) {
        self.tag_name = Some(name.into());
    }

    /// Remove the start and end tags, keeping the content.
    pub fn strip_tag(&mut self) {
        self.tag_name = None;
    }

    #[must_use]
    pub fn content(&self) -> &TagContent {
        &self.content
    }

    pub fn set_content(&mut self, content: TagContent) {
        self.content = content;
    }

    /// Whether the start tag is written as `<name />`.
    #[must_use]
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Remove an attribute from the output, returning its value.
    ///
    /// Directives take their own attributes so they never reach the output.
    pub fn take_attribute(&mut self, name: &str) -> Option<AttrValue> {
        self.attributes.remove(name)
    }

    /// Render nothing for this element: no tags, no attributes, no content.
    ///
    /// Directives ordered after the one that suppressed the output are not run.
    pub fn suppress_output(&mut self) {
        self.tag_name = None;
        self.attributes.clear();
        self.content = TagContent::Html(String::new());
        self.suppressed = true;
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Record a non-fatal problem, reported in the render result.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Attributes, TagContent, bool) {
        (
            self.tag_name,
            self.attributes,
            self.content,
            self.self_closing,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph() -> Element {
        let attrs: Attributes = [("id", "intro")].into_iter().collect();
        Element::new("p").with_attrs(attrs)
    }

    #[test]
    fn test_from_element() {
        let output = TagOutput::from_element(&paragraph());
        assert_eq!(output.tag_name(), Some("p"));
        assert_eq!(output.attributes.get_str("id"), Some("intro"));
        assert_eq!(output.content(), &TagContent::Children);
        assert!(!output.is_suppressed());
        assert!(!output.is_self_closing());
    }

    #[test]
    fn test_strip_tag_keeps_content() {
        let mut output = TagOutput::from_element(&paragraph());
        output.strip_tag();
        assert_eq!(output.tag_name(), None);
        assert_eq!(output.content(), &TagContent::Children);
        assert!(!output.is_suppressed());
    }

    #[test]
    fn test_suppress_output_clears_everything() {
        let mut output = TagOutput::from_element(&paragraph());
        output.suppress_output();
        assert_eq!(output.tag_name(), None);
        assert!(output.attributes.is_empty());
        assert_eq!(output.content(), &TagContent::Html(String::new()));
        assert!(output.is_suppressed());
    }

    #[test]
    fn test_warnings_survive_suppression() {
        let mut output = TagOutput::from_element(&paragraph());
        output.add_warning("skipped");
        output.suppress_output();
        assert_eq!(output.warnings().to_vec(), vec!["skipped".to_owned()]);
        assert_eq!(output.take_warnings(), vec!["skipped".to_owned()]);
        assert!(output.warnings().is_empty());
    }

    #[test]
    fn test_take_attribute() {
        let mut output = TagOutput::from_element(&paragraph());
        assert!(output.take_attribute("ID").is_some());
        assert!(output.take_attribute("id").is_none());
    }

    #[test]
    fn test_set_tag_name() {
        let mut output = TagOutput::from_element(&paragraph());
        output.set_tag_name("section");
        assert_eq!(output.tag_name(), Some("section"));
    }
}
