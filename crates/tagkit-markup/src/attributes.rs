//! Ordered attribute collection attached to one element.

use std::fmt;

/// Value of a single attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    /// Plain text, escaped when written out.
    Text(String),
    /// Pre-encoded markup, written out verbatim.
    Html(String),
}

impl AttrValue {
    /// The value as stored, without escaping.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Html(s) => s,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<&String> for AttrValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Text(if b { "true" } else { "false" }.to_owned())
    }
}

macro_rules! attr_value_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for AttrValue {
            fn from(n: $t) -> Self {
                Self::Text(n.to_string())
            }
        })*
    };
}

attr_value_from_number!(i32, i64, u32, u64, usize, f64);

/// Ordered mapping from attribute name to value.
///
/// Names are unique and compared ASCII-case-insensitively, as in HTML. The
/// first spelling of a name is kept when its value is later overwritten.
/// Insertion order is preserved and determines output order.
///
/// # Example
///
/// ```
/// use tagkit_markup::Attributes;
///
/// let mut attrs = Attributes::new();
/// attrs.set("id", "main");
/// attrs.set("ID", "other");
/// assert_eq!(attrs.len(), 1);
/// assert_eq!(attrs.get_str("id"), Some("other"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<(String, AttrValue)>,
}

impl Attributes {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Whether an attribute with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.position(name).map(|idx| &self.items[idx].1)
    }

    /// Get the raw string of an attribute value.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(AttrValue::as_str)
    }

    /// Set an attribute, overwriting any existing value in place.
    ///
    /// New names are appended at the end.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.items[idx].1 = value,
            None => self.items.push((name, value)),
        }
    }

    /// Remove an attribute, returning its value if it existed.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.position(name).map(|idx| self.items.remove(idx).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove all attributes.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_preserves_order() {
        let mut attrs = Attributes::new();
        attrs.set("b", "2");
        attrs.set("a", "1");
        attrs.set("c", "3");

        let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_overwrite_keeps_position_and_spelling() {
        let mut attrs = Attributes::new();
        attrs.set("Class", "x");
        attrs.set("id", "y");
        attrs.set("class", "z");

        let pairs: Vec<_> = attrs.iter().map(|(k, v)| (k, v.as_str())).collect();
        assert_eq!(pairs, vec![("Class", "z"), ("id", "y")]);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let attrs: Attributes = [("Condition", "true")].into_iter().collect();
        assert!(attrs.contains("condition"));
        assert_eq!(attrs.get_str("CONDITION"), Some("true"));
    }

    #[test]
    fn test_remove() {
        let mut attrs: Attributes = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(attrs.remove("A"), Some(AttrValue::Text("1".to_owned())));
        assert_eq!(attrs.remove("a"), None);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(AttrValue::from(true), AttrValue::Text("true".to_owned()));
        assert_eq!(AttrValue::from(42_i64), AttrValue::Text("42".to_owned()));
        assert_eq!(AttrValue::Html("<b>".to_owned()).to_string(), "<b>");
    }

    #[test]
    fn test_clear() {
        let mut attrs: Attributes = [("a", "1")].into_iter().collect();
        attrs.clear();
        assert!(attrs.is_empty());
    }
}
