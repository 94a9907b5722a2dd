//! Node tree for parsed templates.

use crate::Attributes;

/// Node in a parsed template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Markup element.
    Element(Element),
    /// Raw text, with entity references left as written.
    Text(String),
    /// Comment body (without `<!--` and `-->`).
    Comment(String),
    /// Doctype, CDATA, declaration or processing instruction, kept verbatim.
    Verbatim(String),
}

/// Markup element with its attributes and children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the template.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Attributes,
    /// Child nodes.
    pub children: Vec<Node>,
    /// Written as `<name />` or an HTML void element.
    pub self_closing: bool,
    /// Byte offset of the start tag in the source template.
    pub offset: usize,
}

impl Element {
    /// Create an element with the given tag name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set attributes.
    #[must_use]
    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Mark the element as self-closing.
    #[must_use]
    pub fn self_closing(mut self) -> Self {
        self.self_closing = true;
        self
    }

    /// Whether the tag name matches, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// 1-indexed line number of a byte offset within `source`.
///
/// Offsets past the end report the last line.
#[must_use]
pub fn line_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
