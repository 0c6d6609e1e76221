//! Document-wide repair of `points` style properties.

use std::ops::Range;

use log::{debug, info};
use roxmltree::Document;

use mxguard_core::{
    points::POINTS_KEY,
    style::{PROPERTY_SEPARATOR, StyleMap, VALUE_SEPARATOR},
};

use crate::points::repair_points_value;

const STYLE_ATTRIBUTE: &str = "style";

/// A replacement of one attribute value in the source text.
#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// Repairs every `points` style property of a document.
///
/// Each element whose `style` attribute contains a `points` key gets that
/// value replaced by [`repair_points_value`]. Attribute values that need no
/// change, and all other text, are kept byte for byte. A document that is
/// not well-formed XML is returned unchanged.
///
/// # Example
///
/// ```
/// # use mxguard_parser::repair_points;
/// let doc = r#"<mxCell style="shape=a;points=[[2,0.5]];"/>"#;
/// assert_eq!(repair_points(doc), r#"<mxCell style="shape=a;points=[[1,0.5]]"/>"#);
/// ```
pub fn repair_points(document: &str) -> String {
    let parsed = match Document::parse(document) {
        Ok(parsed) => parsed,
        Err(err) => {
            debug!(err:%; "Document does not parse, skipping points repair");
            return document.to_string();
        }
    };

    let edits: Vec<Edit> = parsed
        .descendants()
        .filter_map(|node| node.attribute_node(STYLE_ATTRIBUTE))
        .filter_map(|attr| {
            repair_style(attr.value()).map(|style| Edit {
                range: attr.range_value(),
                replacement: escape_attribute(&style),
            })
        })
        .collect();

    if edits.is_empty() {
        return document.to_string();
    }

    info!(repaired_count = edits.len(); "Repaired points styles");
    splice(document, edits)
}

/// Returns the re-serialized style if its `points` value had to change.
///
/// A style repeating the `points` key is always rewritten, which keeps only
/// the repaired last value.
fn repair_style(style: &str) -> Option<String> {
    let mut map = StyleMap::parse(style);
    let value = map.get(POINTS_KEY)?;
    let repaired = repair_points_value(value);
    if repaired == value && points_segments(style) < 2 {
        return None;
    }

    map.insert(POINTS_KEY, repaired);
    Some(map.to_string())
}

fn points_segments(style: &str) -> usize {
    style
        .split(PROPERTY_SEPARATOR)
        .filter(|segment| {
            let key = segment
                .split_once(VALUE_SEPARATOR)
                .map_or(*segment, |(key, _)| key);
            key.trim() == POINTS_KEY
        })
        .count()
}

/// Apply non-overlapping edits, which must be sorted by position.
fn splice(source: &str, edits: Vec<Edit>) -> String {
    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        output.push_str(&source[cursor..edit.range.start]);
        output.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    output.push_str(&source[cursor..]);
    output
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#xa;"),
            '\r' => escaped.push_str("&#xd;"),
            '\t' => escaped.push_str("&#x9;"),
            c => escaped.push(c),
        }
    }
    escaped
}
