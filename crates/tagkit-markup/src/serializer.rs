//! Writes a node tree back to markup.

use std::fmt::Write;

use crate::{AttrValue, Attributes, Element, Node};

/// Serialize nodes to a markup string.
#[must_use]
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        serialize_node(node, &mut out);
    }
    out
}

fn serialize_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(el) => serialize_element(el, out),
        Node::Text(text) | Node::Verbatim(text) => out.push_str(text),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn serialize_element(el: &Element, out: &mut String) {
    let self_closing = el.self_closing && el.children.is_empty();
    write_start_tag(out, &el.name, &el.attrs, self_closing);
    if self_closing {
        return;
    }
    for child in &el.children {
        serialize_node(child, out);
    }
    write_end_tag(out, &el.name);
}

/// Write `<name attrs>` (or `<name attrs />` when `self_closing`).
pub fn write_start_tag(out: &mut String, name: &str, attrs: &Attributes, self_closing: bool) {
    out.push('<');
    out.push_str(name);

    for (key, value) in attrs.iter() {
        match value {
            AttrValue::Text(text) => {
                let _ = write!(out, r#" {key}="{}""#, escape_attr(text));
            }
            AttrValue::Html(html) => {
                let _ = write!(out, r#" {key}="{html}""#);
            }
        }
    }

    out.push_str(if self_closing { " />" } else { ">" });
}

/// Write `</name>`.
pub fn write_end_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Escape text for use inside a double-quoted attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}
