//! Locating the document inside generated text.
//!
//! Generation services wrap the document in Markdown fences or precede it
//! with explanatory prose. [`extract`] returns the document itself.

use log::debug;

/// Opening tag of the document root element.
pub const ROOT_TAG: &str = "<mxfile";

const ROOT_CLOSE_TAG: &str = "</mxfile";

const FENCE: &str = "```";

/// Extracts the document from raw generated text.
///
/// 1. Text starting with a fenced block yields the trimmed block interior.
/// 2. Otherwise, text containing [`ROOT_TAG`] yields the text from that tag
///    up to the end of the last closing root tag, dropping surrounding prose
///    and stray fences.
/// 3. Otherwise the trimmed text is returned unchanged.
///
/// Purely textual, never fails.
///
/// # Example
///
/// ```
/// # use mxguard_parser::extract;
/// let raw = "```xml\n<mxfile><diagram/></mxfile>\n```";
/// assert_eq!(extract(raw), "<mxfile><diagram/></mxfile>");
///
/// let raw = "Here is your diagram:\n```xml\n<mxfile></mxfile>\n```";
/// assert_eq!(extract(raw), "<mxfile></mxfile>");
/// ```
pub fn extract(raw: &str) -> String {
    if let Some(interior) = fenced_interior(raw.trim_start()) {
        debug!("Extracted document from fenced block");
        return interior.trim().to_string();
    }

    if let Some(offset) = raw.find(ROOT_TAG) {
        if offset > 0 {
            debug!(offset; "Dropped text preceding the document root");
        }
        return through_root_close(&raw[offset..]).trim().to_string();
    }

    raw.trim().to_string()
}

/// Cuts `document` after its last closing root tag, if it has one.
fn through_root_close(document: &str) -> &str {
    let Some(close) = document.rfind(ROOT_CLOSE_TAG) else {
        return document;
    };
    let Some(gt) = document[close..].find('>') else {
        return document;
    };

    let end = close + gt + 1;
    if !document[end..].trim().is_empty() {
        debug!(dropped_len = document.len() - end; "Dropped text following the document root");
    }
    &document[..end]
}

/// Returns the content of a fenced block opening `text`, if it is closed.
///
/// The opening fence may carry a language tag, e.g. ```` ```xml ````.
fn fenced_interior(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let body = &rest[tag_len..];
    let close = body.find(FENCE)?;

    Some(&body[..close])
}
