//! Template parser built on quick-xml.
//!
//! The reader runs in a lenient mode suited to hand-written HTML: end tag
//! names are not checked, stray end tags are ignored, attributes may be
//! unquoted or valueless, and void elements such as `<br>` need no closing
//! tag. Text is kept as written; entity references are not decoded.
//!
//! `<script>` and `<style>` bodies are copied verbatim up to the matching
//! end tag. Elsewhere a bare `&` or `<` in text is a syntax error.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::{AttrValue, Attributes, Element, MarkupError, Node};

/// HTML elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// HTML elements whose content is not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Deepest element nesting accepted. Rendering recurses once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Whether `name` is an HTML void element.
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Parse a template into a list of top-level nodes.
///
/// # Example
///
/// ```
/// use tagkit_markup::{Node, parse};
///
/// let nodes = parse(r#"<if is="true"><p>Shown</p></if>"#).unwrap();
/// let Node::Element(el) = &nodes[0] else { panic!() };
/// assert_eq!(el.name, "if");
/// assert_eq!(el.attrs.get_str("is"), Some("true"));
/// assert_eq!(el.children.len(), 1);
/// ```
pub fn parse(source: &str) -> Result<Vec<Node>, MarkupError> {
    // Byte offset in `source` where `reader` starts. The reader is restarted
    // after each raw-text element.
    let mut base = 0;
    let mut reader = new_reader(source);
    let mut builder = TreeBuilder::default();

    loop {
        let offset = base + to_usize(reader.buffer_position());
        let event = reader.read_event().map_err(|source| MarkupError::Xml {
            offset: u64::try_from(base)
                .unwrap_or(u64::MAX)
                .saturating_add(reader.error_position()),
            source,
        })?;

        match event {
            Event::Start(e) => {
                let mut el = decode_element(&reader, &e, offset)?;
                if is_void_element(&el.name) {
                    el.self_closing = true;
                    builder.push(Node::Element(el));
                } else if is_raw_text_element(&el.name) {
                    let body_start = base + to_usize(reader.buffer_position());
                    let (body, resume) = split_raw_text(source, body_start, &el.name);
                    if !body.is_empty() {
                        el.children.push(Node::Verbatim(body.to_owned()));
                    }
                    builder.open(el)?;
                    builder.close_innermost();
                    base = resume;
                    reader = new_reader(&source[base..]);
                } else {
                    builder.open(el)?;
                }
            }
            Event::Empty(e) => {
                let mut el = decode_element(&reader, &e, offset)?;
                el.self_closing = true;
                builder.push(Node::Element(el));
            }
            Event::End(e) => {
                let qname = e.name();
                let name = decode(&reader, qname.as_ref())?;
                builder.close(&name);
            }
            Event::Text(e) => {
                let text = decode(&reader, &e)?;
                builder.push_text(&text);
            }
            Event::GeneralRef(e) => {
                let name = decode(&reader, &e)?;
                builder.push_text(&format!("&{name};"));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e);
                builder.push(Node::Verbatim(format!("<![CDATA[{text}]]>")));
            }
            Event::Comment(e) => {
                let text = decode(&reader, &e)?;
                builder.push(Node::Comment(text.into_owned()));
            }
            Event::DocType(e) => {
                let text = decode(&reader, &e)?;
                builder.push(Node::Verbatim(format!("<!DOCTYPE {}>", text.trim())));
            }
            Event::Decl(e) => {
                let text = decode(&reader, &e)?;
                builder.push(Node::Verbatim(format!("<?{text}?>")));
            }
            Event::PI(e) => {
                let text = decode(&reader, &e)?;
                builder.push(Node::Verbatim(format!("<?{text}?>")));
            }
            Event::Eof => break,
        }
    }

    Ok(builder.finish())
}

fn new_reader(source: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Split off the raw body of a `name` element starting at `start`.
///
/// Returns the body and the offset just past its end tag. An unclosed
/// element takes the rest of the source.
fn split_raw_text<'s>(source: &'s str, start: usize, name: &str) -> (&'s str, usize) {
    let rest = &source[start..];
    let Some(end) = find_end_tag(rest, name) else {
        return (rest, source.len());
    };
    let after = rest[end..]
        .find('>')
        .map_or(source.len(), |gt| start + end + gt + 1);
    (&rest[..end], after)
}

/// Byte offset of the first `</name` in `text`, ignoring ASCII case.
fn find_end_tag(text: &str, name: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let name = name.as_bytes();
    let mut from = 0;
    while let Some(idx) = text[from..].find("</") {
        let at = from + idx;
        let name_end = at + 2 + name.len();
        if bytes
            .get(at + 2..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            && bytes
                .get(name_end)
                .is_none_or(|&b| b == b'>' || b == b'/' || b.is_ascii_whitespace())
        {
            return Some(at);
        }
        from = at + 2;
    }
    None
}

fn to_usize(pos: u64) -> usize {
    usize::try_from(pos).unwrap_or(usize::MAX)
}

fn decode<'b>(reader: &Reader<&[u8]>, bytes: &'b [u8]) -> Result<Cow<'b, str>, MarkupError> {
    Ok(reader.decoder().decode(bytes)?)
}

fn decode_element(
    reader: &Reader<&[u8]>,
    e: &BytesStart,
    offset: usize,
) -> Result<Element, MarkupError> {
    let name = decode(reader, e.name().as_ref())?.into_owned();

    let mut attrs = Attributes::new();
    for attr in e.html_attributes() {
        let attr = attr?;
        let key = decode(reader, attr.key.as_ref())?.into_owned();
        // Values that are not valid XML escapes (`a && b`, `&nbsp;`) are kept
        // as written and must not be escaped again on output.
        let value = match attr.unescape_value() {
            Ok(text) => AttrValue::Text(text.into_owned()),
            Err(_) => {
                AttrValue::Html(String::from_utf8_lossy(&attr.value).replace('"', "&quot;"))
            }
        };
        attrs.set(key, value);
    }

    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
        self_closing: false,
        offset,
    })
}

/// Stack-based tree assembly tolerant of unclosed and stray tags.
#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn push_text(&mut self, text: &str) {
        let siblings = match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        if let Some(Node::Text(last)) = siblings.last_mut() {
            last.push_str(text);
        } else {
            siblings.push(Node::Text(text.to_owned()));
        }
    }

    fn open(&mut self, el: Element) -> Result<(), MarkupError> {
        if self.open.len() >= MAX_NESTING_DEPTH {
            return Err(MarkupError::TooDeep {
                offset: el.offset,
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.open.push(el);
        Ok(())
    }

    fn close_innermost(&mut self) {
        if let Some(el) = self.open.pop() {
            self.push(Node::Element(el));
        }
    }

    /// Close the innermost open element named `name`.
    ///
    /// Elements opened after it are closed implicitly. End tags with no
    /// matching open element are dropped.
    fn close(&mut self, name: &str) {
        let Some(idx) = self.open.iter().rposition(|el| el.is(name)) else {
            return;
        };
        while self.open.len() > idx {
            if let Some(el) = self.open.pop() {
                self.push(Node::Element(el));
            }
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while let Some(el) = self.open.pop() {
            self.push(Node::Element(el));
        }
        self.roots
    }
}
