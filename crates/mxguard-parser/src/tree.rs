//! Building the typed cell tree from document text.
//!
//! A draw.io document nests its cells as
//! `mxfile > diagram > mxGraphModel > root > mxCell*`. [`parse_cells`]
//! walks that nesting once and produces [`Cell`]s with their spans, so the
//! checks in [`validate`](crate::validate) work on typed data only.

use log::{debug, trace};
use roxmltree::{Document, Node, TextPos};
use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, opt},
    error::ModalResult,
    token::one_of,
};

use mxguard_core::{
    cell::{Cell, CellKind, EdgeEndpoints, Geometry},
    style::StyleMap,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, Result},
    span::{Span, Spanned},
};

/// Required nesting from the document element down to the cell container,
/// with the code reported when a level is missing.
const NESTING: [(&str, ErrorCode); 4] = [
    ("mxfile", ErrorCode::E100),
    ("diagram", ErrorCode::E101),
    ("mxGraphModel", ErrorCode::E102),
    ("root", ErrorCode::E103),
];

/// Wrapper elements draw.io emits around an `mxCell` to attach metadata.
/// The wrapper carries the id; the inner cell carries everything else.
const CELL_WRAPPERS: [&str; 2] = ["object", "UserObject"];

const CELL_TAG: &str = "mxCell";
const GEOMETRY_TAG: &str = "mxGeometry";

/// The cells of a document, in document order.
#[derive(Debug, Clone, Default)]
pub struct CellTree {
    cells: Vec<Spanned<Cell>>,
}

impl CellTree {
    pub fn cells(&self) -> &[Spanned<Cell>] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Parse a document into its cell tree.
///
/// # Errors
///
/// Returns a fatal diagnostic when the text is not well-formed XML
/// ([`ErrorCode::E001`]) or a nesting level is missing (`E100`..`E103`).
/// Lenient reads, such as non-numeric geometry, are emitted to `diagnostics`
/// as warnings.
pub(crate) fn parse_cells(source: &str, diagnostics: &mut DiagnosticCollector) -> Result<CellTree> {
    let document = Document::parse(source).map_err(|err| syntax_error(source, &err))?;

    let container = cell_container(&document)?;

    let mut cells = Vec::new();
    for node in container.children().filter(Node::is_element) {
        match read_cell(node, diagnostics) {
            Some(cell) => cells.push(cell),
            None => {
                debug!(tag = node.tag_name().name(); "Skipping non-cell element");
            }
        }
    }

    debug!(cells_count = cells.len(); "Cell tree built");
    Ok(CellTree { cells })
}

/// Walk the required nesting down to the `root` element.
///
/// The first child with the expected name is taken at each level, so only
/// the first page of a multi-page document is checked.
fn cell_container<'a, 'input>(document: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    let (root_name, root_code) = NESTING[0];
    let mut current = document.root_element();
    if current.tag_name().name() != root_name {
        return Err(missing_level(root_name, None, root_code).with_label(
            node_span(current),
            format!("found `<{}>` instead", current.tag_name().name()),
        ));
    }

    for window in NESTING.windows(2) {
        let (parent_name, _) = window[0];
        let (name, code) = window[1];

        current = current
            .children()
            .find(|child| child.has_tag_name(name))
            .ok_or_else(|| {
                missing_level(name, Some(parent_name), code)
                    .with_label(node_span(current), format!("`<{parent_name}>` opened here"))
            })?;
    }

    Ok(current)
}

fn missing_level(name: &str, parent: Option<&str>, code: ErrorCode) -> Diagnostic {
    let message = match parent {
        Some(parent) => format!("missing `<{name}>` element inside `<{parent}>`"),
        None => format!("missing root `<{name}>` element"),
    };
    Diagnostic::error(message)
        .with_code(code)
        .with_help("a draw.io document nests mxfile > diagram > mxGraphModel > root > mxCell")
}

/// Read one child of `root` as a cell.
///
/// Returns `None` for elements that are neither cells nor cell wrappers.
fn read_cell(node: Node<'_, '_>, diagnostics: &mut DiagnosticCollector) -> Option<Spanned<Cell>> {
    let name = node.tag_name().name();
    let (id, cell_node) = if name == CELL_TAG {
        (node.attribute("id"), node)
    } else if CELL_WRAPPERS.contains(&name) {
        let inner = node
            .children()
            .find(|child| child.has_tag_name(CELL_TAG))
            .unwrap_or(node);
        (node.attribute("id"), inner)
    } else {
        return None;
    };

    let span = node_span(node);
    if id.is_none() {
        diagnostics.emit(
            Diagnostic::warning("cell without an `id` attribute")
                .with_code(ErrorCode::W002)
                .with_label(span, ErrorCode::W002.description())
                .with_help("cells without an id cannot be referenced by edges"),
        );
    }

    let kind = if cell_node.attribute("edge") == Some("1") {
        CellKind::Edge(EdgeEndpoints::new(
            cell_node.attribute("source").map(str::to_string),
            cell_node.attribute("target").map(str::to_string),
        ))
    } else if cell_node.attribute("vertex") == Some("1") {
        CellKind::Vertex
    } else {
        CellKind::Plain
    };

    let mut cell = Cell::new(id.map(str::to_string), kind)
        .with_style(StyleMap::parse(cell_node.attribute("style").unwrap_or_default()));
    if let Some(parent) = cell_node.attribute("parent") {
        cell = cell.with_parent(parent);
    }
    if let Some(geometry) = cell_node
        .children()
        .find(|child| child.has_tag_name(GEOMETRY_TAG))
    {
        cell = cell.with_geometry(read_geometry(geometry, diagnostics));
    }

    trace!(cell:?; "Read cell");
    Some(Spanned::new(cell, span))
}

/// Read `x`, `y`, `width` and `height`, defaulting absent or empty ones to
/// `0`.
///
/// A value with trailing garbage is read by its numeric prefix (`2500px` is
/// `2500`); one without any is `NaN`. Both emit a warning.
fn read_geometry(node: Node<'_, '_>, diagnostics: &mut DiagnosticCollector) -> Geometry {
    let mut read = |name: &str| -> f64 {
        let raw = match node.attribute(name).map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return 0.0,
        };
        let (value, note) = match numeric_prefix(raw) {
            Some((value, len)) if len == raw.len() => return value,
            Some((value, _)) => (value, format!("read as {value}")),
            None => (f64::NAN, "ignored by the extent check".to_string()),
        };
        diagnostics.emit(
            Diagnostic::warning(format!("geometry `{name}` is not a number: `{raw}`"))
                .with_code(ErrorCode::W001)
                .with_label(node_span(node), note),
        );
        value
    };

    Geometry::new(read("x"), read("y"), read("width"), read("height"))
}

/// Longest leading decimal number of `raw` and its length in bytes.
fn numeric_prefix(raw: &str) -> Option<(f64, usize)> {
    let mut input = raw;
    let digits: ModalResult<&str> = (
        opt(one_of(['+', '-'])),
        alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(&mut input);
    let digits = digits.ok()?;
    let value = str::parse::<f64>(digits).ok()?;

    value.is_finite().then_some((value, digits.len()))
}

/// Span of an element's start tag, falling back to the whole element.
fn node_span(node: Node<'_, '_>) -> Span {
    let range = node.range();
    let input = node.document().input_text();
    let tag_end = input[range.clone()]
        .find('>')
        .map_or(range.end, |idx| range.start + idx + 1);

    Span::new(range.start..tag_end)
}

fn syntax_error(source: &str, err: &roxmltree::Error) -> Diagnostic {
    let offset = byte_offset(source, err.pos());
    let end = source[offset..]
        .chars()
        .next()
        .map_or(offset, |c| offset + c.len_utf8());

    Diagnostic::error(format!("XML syntax error: {err}"))
        .with_code(ErrorCode::E001)
        .with_label(Span::new(offset..end), ErrorCode::E001.description())
        .with_help("the document must be well-formed XML")
}

/// Convert a 1-based row/column text position into a byte offset.
fn byte_offset(source: &str, pos: TextPos) -> usize {
    let row = pos.row.max(1) as usize;
    let col = pos.col.max(1) as usize;

    let line_start = source
        .split_inclusive('\n')
        .take(row - 1)
        .map(str::len)
        .sum::<usize>()
        .min(source.len());

    source[line_start..]
        .char_indices()
        .nth(col - 1)
        .map_or(source.len(), |(idx, _)| line_start + idx)
}
