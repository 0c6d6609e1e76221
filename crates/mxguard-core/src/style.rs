//! Cell style property bags.
//!
//! Every draw.io cell carries a `style` attribute: a `;`-separated list of
//! `key=value` properties and bare flags, e.g.
//! `shape=mxgraph.aws4.group;grIcon=mxgraph.aws4.group_vpc;html`.
//! [`StyleMap`] is the ordered map form of that list.
//!
//! # Round trip
//!
//! Parsing the serialized form of a parsed style yields the same key/value
//! pairs. Order is preserved by the map but does not take part in equality.
//!
//! ```
//! # use mxguard_core::style::StyleMap;
//! let style = StyleMap::parse("rounded=0; html ;whiteSpace=wrap;;");
//! assert_eq!(style.get("rounded"), Some("0"));
//! assert!(style.is_flag("html"));
//! assert_eq!(style.to_string(), "rounded=0;html;whiteSpace=wrap");
//! assert_eq!(StyleMap::parse(&style.to_string()), style);
//! ```

use std::fmt;

use indexmap::IndexMap;

/// Separator between style properties.
pub const PROPERTY_SEPARATOR: char = ';';

/// Separator between a property key and its value.
pub const VALUE_SEPARATOR: char = '=';

/// Ordered mapping from style property name to value.
///
/// Flag properties (segments without `=`) are stored with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    properties: IndexMap<String, String>,
}

impl StyleMap {
    /// Creates an empty style map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a style string.
    ///
    /// Segments are trimmed; empty segments and segments with an empty key
    /// are ignored. Only the first `=` of a segment separates key from value.
    /// When a key repeats, the later value wins and the key keeps its first
    /// position.
    pub fn parse(style: &str) -> Self {
        let mut properties = IndexMap::new();

        for segment in style.split(PROPERTY_SEPARATOR) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let (key, value) = match segment.split_once(VALUE_SEPARATOR) {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (segment, ""),
            };
            if key.is_empty() {
                continue;
            }
            properties.insert(key.to_string(), value.to_string());
        }

        Self { properties }
    }

    /// Returns the value of a property, or `None` when absent.
    ///
    /// Flags return `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns `true` if the property is present, flag or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Returns `true` if the property is present without a value.
    pub fn is_flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(str::is_empty)
    }

    /// Sets a property, keeping its position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Sets a flag property.
    pub fn insert_flag(&mut self, key: impl Into<String>) {
        self.insert(key, String::new());
    }

    /// Returns `true` if any key or value contains `needle`.
    ///
    /// Category markers such as `group_vpc` appear inside values like
    /// `grIcon=mxgraph.aws4.group_vpc`, so this is a substring match.
    pub fn mentions(&self, needle: &str) -> bool {
        self.properties
            .iter()
            .any(|(key, value)| key.contains(needle) || value.contains(needle))
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, "{PROPERTY_SEPARATOR}")?;
            }
            if value.is_empty() {
                write!(f, "{key}")?;
            } else {
                write!(f, "{key}{VALUE_SEPARATOR}{value}")?;
            }
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for StyleMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
