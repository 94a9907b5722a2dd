//! Helpers for composing CSS classes, inline styles and namespaced
//! attributes onto an [`Attributes`] collection.
//!
//! All helpers mutate only the collection they are given.
//!
//! # Example
//!
//! ```
//! use tagkit_markup::Attributes;
//!
//! let mut attrs = Attributes::new();
//! attrs.set("class", "btn");
//! attrs.add_css_classes(["btn-primary", "wide"]);
//! attrs.add_css_style("color", "red");
//! attrs.add_aria_attribute("hidden", true);
//!
//! assert_eq!(attrs.get_str("class"), Some("btn btn-primary wide"));
//! assert_eq!(attrs.get_str("style"), Some("color: red;"));
//! assert_eq!(attrs.get_str("aria-hidden"), Some("true"));
//! ```

use crate::{AttrValue, Attributes};

const CLASS: &str = "class";
const STYLE: &str = "style";

impl Attributes {
    /// Add a single CSS class. See [`add_css_classes`](Self::add_css_classes).
    pub fn add_css_class(&mut self, class: &str) {
        self.add_css_classes([class]);
    }

    /// Add CSS classes after any existing `class` value.
    ///
    /// The existing value is trimmed and placed first; all tokens are joined
    /// with a single space. Duplicates are not removed.
    pub fn add_css_classes<I, S>(&mut self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens: Vec<String> = Vec::new();

        if let Some(existing) = self.get_str(CLASS) {
            let existing = existing.trim();
            if !existing.is_empty() {
                tokens.push(existing.to_owned());
            }
        }
        tokens.extend(classes.into_iter().map(|c| c.as_ref().to_owned()));

        self.set(CLASS, tokens.join(" "));
    }

    /// Remove one CSS class.
    ///
    /// Splits the existing value on single spaces and drops the first
    /// matching token. When no tokens remain the `class` attribute is
    /// removed.
    pub fn remove_css_class(&mut self, class: &str) {
        let Some(existing) = self.get_str(CLASS) else {
            return;
        };

        let mut tokens: Vec<&str> = existing.split(' ').collect();
        if let Some(idx) = tokens.iter().position(|t| *t == class) {
            tokens.remove(idx);
        }

        if tokens.is_empty() {
            self.remove(CLASS);
        } else {
            let joined = tokens.join(" ");
            self.set(CLASS, joined);
        }
    }

    /// Append a `name: value;` declaration to the `style` attribute.
    pub fn add_css_style(&mut self, name: &str, value: &str) {
        let declaration = format!("{name}: {value};");

        let merged = match self.get_str(STYLE) {
            Some(existing) if !existing.is_empty() => {
                let separator = if existing.ends_with(';') { " " } else { "; " };
                format!("{existing}{separator}{declaration}")
            }
            _ => declaration,
        };

        self.set(STYLE, merged);
    }

    /// Set `aria-<name>`, overwriting any existing value.
    pub fn add_aria_attribute(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.merge_attribute(format!("aria-{name}"), value);
    }

    /// Set `data-<name>`, overwriting any existing value.
    pub fn add_data_attribute(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.merge_attribute(format!("data-{name}"), value);
    }

    /// Set an attribute, overwriting any existing value.
    pub fn merge_attribute(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.set(key, value);
    }
}
