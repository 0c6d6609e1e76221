//! Structural validation of documents.
//!
//! [`validate_with`] parses a document into its [`CellTree`] and runs every
//! structural check against it, reporting all violations rather than the
//! first. Only a malformed document or a missing nesting level stops the
//! checks early, since the remaining checks need a cell list.
//!
//! Checks run, and report, in this order:
//!
//! 1. duplicate ids ([`ErrorCode::E200`])
//! 2. boundary container present ([`ErrorCode::E300`])
//! 3. entry point present ([`ErrorCode::E301`])
//! 4. edge endpoints exist ([`ErrorCode::E201`])
//! 5. horizontal extent within the limit ([`ErrorCode::E400`])

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info};

use mxguard_core::cell::Cell;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::{Span, Spanned},
    tree::{self, CellTree},
};

/// Default maximum horizontal extent, in diagram units.
pub const DEFAULT_MAX_EXTENT: f64 = 3000.0;

/// Default style marker of the boundary container category.
pub const DEFAULT_BOUNDARY_MARKERS: &[&str] = &["group_vpc"];

/// Default style markers of the entry point categories.
pub const DEFAULT_ENTRY_MARKERS: &[&str] = &[
    "application_load_balancer",
    "network_load_balancer",
    "internet_gateway",
    "api_gateway",
    "cloudfront",
];

/// The limits and category markers a document is checked against.
///
/// A cell belongs to a category when any part of its style contains one of
/// the category's markers.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRules {
    max_extent: f64,
    boundary_markers: Vec<String>,
    entry_markers: Vec<String>,
}

impl ValidationRules {
    /// Creates rules with the given limit and marker lists.
    pub fn new(max_extent: f64, boundary_markers: Vec<String>, entry_markers: Vec<String>) -> Self {
        Self {
            max_extent,
            boundary_markers,
            entry_markers,
        }
    }

    pub fn max_extent(&self) -> f64 {
        self.max_extent
    }

    pub fn boundary_markers(&self) -> &[String] {
        &self.boundary_markers
    }

    pub fn entry_markers(&self) -> &[String] {
        &self.entry_markers
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_EXTENT,
            DEFAULT_BOUNDARY_MARKERS.iter().map(|m| m.to_string()).collect(),
            DEFAULT_ENTRY_MARKERS.iter().map(|m| m.to_string()).collect(),
        )
    }
}

/// Every finding of one validation pass, in discovery order.
///
/// A document is valid when no finding has error severity; warnings are
/// kept for reporting only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Returns `true` when no error was found.
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// All findings, errors and warnings, in discovery order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Error findings in discovery order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diag| diag.is_error())
    }

    /// Warning findings in discovery order.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diag| !diag.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns `true` if any finding carries `code`.
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|diag| diag.code() == Some(code))
    }
}

/// Validate a document against the default rules.
///
/// # Example
///
/// ```
/// # use mxguard_parser::{validate, error::ErrorCode};
/// let result = validate("<mxfile><unclosed");
/// assert!(!result.is_valid());
/// assert!(result.has_code(ErrorCode::E001));
/// ```
pub fn validate(document: &str) -> ValidationResult {
    validate_with(document, &ValidationRules::default())
}

/// Validate a document against `rules`.
///
/// Pure and total: findings are returned as data, never raised.
pub fn validate_with(document: &str, rules: &ValidationRules) -> ValidationResult {
    info!(document_len = document.len(); "Validating document");

    let mut collector = DiagnosticCollector::new();
    let tree = match tree::parse_cells(document, &mut collector) {
        Ok(tree) => tree,
        Err(diag) => {
            debug!(code:? = diag.code(); "Fatal finding, skipping cell checks");
            collector.emit(diag);
            return collector.finish();
        }
    };

    let mut checker = Checker {
        tree: &tree,
        rules,
        collector,
    };
    checker.check_duplicate_ids();
    checker.check_boundary_container();
    checker.check_entry_point();
    checker.check_edge_references();
    checker.check_extents();

    if !checker.collector.has_errors() {
        debug!("No structural errors found");
    }
    let result = checker.collector.finish();
    info!(
        cells_count = tree.len(),
        errors_count = result.error_count(),
        valid = result.is_valid();
        "Validation finished"
    );
    result
}

/// Runs the aggregating checks over one cell tree.
struct Checker<'a> {
    tree: &'a CellTree,
    rules: &'a ValidationRules,
    collector: DiagnosticCollector,
}

impl Checker<'_> {
    fn cells(&self) -> impl Iterator<Item = &Spanned<Cell>> {
        self.tree.cells().iter()
    }

    /// One error per id used more than once, in order of first use.
    fn check_duplicate_ids(&mut self) {
        let mut uses: IndexMap<&str, Vec<Span>> = IndexMap::new();
        for cell in self.tree.cells() {
            if let Some(id) = cell.id() {
                uses.entry(id).or_default().push(cell.span());
            }
        }

        for (id, spans) in uses {
            let [first, duplicates @ ..] = spans.as_slice() else {
                continue;
            };
            let Some(second) = duplicates.first() else {
                continue;
            };

            let mut diag = Diagnostic::error(format!(
                "duplicate cell id `{id}` used by {} cells",
                spans.len()
            ))
            .with_code(ErrorCode::E200)
            .with_label(*second, "duplicate definition")
            .with_secondary_label(*first, "first defined here");
            for span in &duplicates[1..] {
                diag = diag.with_secondary_label(*span, "also defined here");
            }
            self.collector
                .emit(diag.with_help("give every cell a distinct id"));
        }
    }

    fn check_boundary_container(&mut self) {
        if self.any_cell_mentions(self.rules.boundary_markers()) {
            return;
        }

        self.collector.emit(
            Diagnostic::error(format!(
                "missing boundary container (no cell style contains {})",
                describe_markers(self.rules.boundary_markers())
            ))
            .with_code(ErrorCode::E300)
            .with_help("wrap the network resources in a boundary group such as a VPC"),
        );
    }

    fn check_entry_point(&mut self) {
        if self.any_cell_mentions(self.rules.entry_markers()) {
            return;
        }

        self.collector.emit(
            Diagnostic::error(format!(
                "missing entry point (no cell style contains {})",
                describe_markers(self.rules.entry_markers())
            ))
            .with_code(ErrorCode::E301)
            .with_help("add an ingress such as a load balancer, internet gateway or API gateway"),
        );
    }

    /// One error per dangling end; source before target.
    fn check_edge_references(&mut self) {
        let ids: HashSet<&str> = self.cells().filter_map(|cell| cell.id()).collect();

        let mut found = Vec::new();
        for cell in self.cells() {
            let Some(endpoints) = cell.endpoints() else {
                continue;
            };
            for (end, reference) in [("source", endpoints.source()), ("target", endpoints.target())] {
                let Some(reference) = reference else {
                    continue;
                };
                if ids.contains(reference) {
                    continue;
                }
                found.push(
                    Diagnostic::error(format!(
                        "edge `{}` references non-existent {end} `{reference}`",
                        cell.display_id()
                    ))
                    .with_code(ErrorCode::E201)
                    .with_label(cell.span(), format!("{end} not found"))
                    .with_help("point the edge at an existing cell id or remove it"),
                );
            }
        }

        for diag in found {
            self.collector.emit(diag);
        }
    }

    fn check_extents(&mut self) {
        let limit = self.rules.max_extent();

        let mut found = Vec::new();
        for cell in self.cells() {
            let Some(geometry) = cell.geometry() else {
                continue;
            };
            let Some(extent) = geometry.horizontal_extent() else {
                continue;
            };
            if extent <= limit {
                continue;
            }
            found.push(
                Diagnostic::error(format!(
                    "cell `{}` extends to {extent} beyond the {limit} limit (x={}, width={})",
                    cell.display_id(),
                    geometry.x(),
                    geometry.width()
                ))
                .with_code(ErrorCode::E400)
                .with_label(cell.span(), format!("x + width = {extent}"))
                .with_help(format!("move or shrink the cell so that x + width <= {limit}")),
            );
        }

        for diag in found {
            self.collector.emit(diag);
        }
    }

    fn any_cell_mentions(&self, markers: &[String]) -> bool {
        self.cells().any(|cell| {
            markers
                .iter()
                .any(|marker| cell.style().mentions(marker))
        })
    }
}

fn describe_markers(markers: &[String]) -> String {
    match markers {
        [] => "any configured marker".to_string(),
        [only] => format!("`{only}`"),
        _ => {
            let quoted: Vec<String> = markers.iter().map(|m| format!("`{m}`")).collect();
            format!("any of {}", quoted.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VPC: &str = r#"<mxCell id="vpc" style="grIcon=mxgraph.aws4.group_vpc" vertex="1" parent="1"><mxGeometry x="0" y="0" width="100" height="100" as="geometry"/></mxCell>"#;
    const IGW: &str = r#"<mxCell id="igw" style="resIcon=mxgraph.aws4.internet_gateway" vertex="1" parent="1"><mxGeometry x="10" y="10" width="60" height="60" as="geometry"/></mxCell>"#;

    fn document(cells: &str) -> String {
        format!(
            r#"<mxfile><diagram><mxGraphModel><root><mxCell id="0"/><mxCell id="1" parent="0"/>{cells}</root></mxGraphModel></diagram></mxfile>"#
        )
    }

    fn codes(result: &ValidationResult) -> Vec<ErrorCode> {
        result.errors().filter_map(Diagnostic::code).collect()
    }

    #[test]
    fn test_minimal_valid_document() {
        let result = validate(&document(&format!("{VPC}{IGW}")));

        assert!(result.is_valid(), "{:?}", result.diagnostics());
        assert_eq!(result.error_count(), 0);
    }

    #[test]
    fn test_duplicate_id_named_once() {
        let cells = format!(
            r#"{VPC}{IGW}<mxCell id="a" vertex="1"/><mxCell id="a" vertex="1"/><mxCell id="a" vertex="1"/>"#
        );

        let result = validate(&document(&cells));

        assert_eq!(codes(&result), vec![ErrorCode::E200]);
        let diag = result.errors().next().expect("one error");
        assert!(diag.message().contains("`a`"));
        assert_eq!(diag.labels().len(), 3);
        assert!(diag.labels()[0].is_primary());
    }

    #[test]
    fn test_each_duplicated_id_reported() {
        let cells = format!(
            r#"{VPC}{IGW}<mxCell id="a"/><mxCell id="b"/><mxCell id="b"/><mxCell id="a"/>"#
        );

        let result = validate(&document(&cells));

        let messages: Vec<&str> = result.errors().map(Diagnostic::message).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("`a`"));
        assert!(messages[1].contains("`b`"));
    }

    #[test]
    fn test_missing_boundary_and_entry_both_reported() {
        let result = validate(&document(r#"<mxCell id="a" vertex="1"/>"#));

        assert_eq!(codes(&result), vec![ErrorCode::E300, ErrorCode::E301]);
    }

    #[test]
    fn test_each_entry_marker_qualifies() {
        for marker in DEFAULT_ENTRY_MARKERS {
            let cells = format!(r#"{VPC}<mxCell id="e" style="shape=mxgraph.aws4.{marker}" vertex="1"/>"#);

            let result = validate(&document(&cells));

            assert!(result.is_valid(), "{marker}: {:?}", result.diagnostics());
        }
    }

    #[test]
    fn test_dangling_source_and_target_reported_separately() {
        let cells = format!(
            r#"{VPC}{IGW}<mxCell id="e1" edge="1" source="ghost" target="phantom" parent="1"/>"#
        );

        let result = validate(&document(&cells));

        let messages: Vec<&str> = result.errors().map(Diagnostic::message).collect();
        assert_eq!(
            messages,
            vec![
                "edge `e1` references non-existent source `ghost`",
                "edge `e1` references non-existent target `phantom`",
            ]
        );
    }

    #[test]
    fn test_edge_without_endpoints_is_fine() {
        let cells = format!(r#"{VPC}{IGW}<mxCell id="e1" edge="1" parent="1"/>"#);

        assert!(validate(&document(&cells)).is_valid());
    }

    #[test]
    fn test_extent_error_names_cell_extent_and_limit() {
        let cells = format!(
            r#"{VPC}{IGW}<mxCell id="wide" vertex="1"><mxGeometry x="2500" width="800"/></mxCell>"#
        );

        let result = validate(&document(&cells));

        assert_eq!(codes(&result), vec![ErrorCode::E400]);
        let message = result.errors().next().expect("one error").message();
        assert!(message.contains("`wide`"));
        assert!(message.contains("3300"));
        assert!(message.contains("3000"));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ValidationRules::new(
            50.0,
            vec!["group_vpc".to_string()],
            vec!["internet_gateway".to_string()],
        );

        let result = validate_with(&document(&format!("{VPC}{IGW}")), &rules);

        // vpc: 0 + 100, igw: 10 + 60
        assert_eq!(codes(&result), vec![ErrorCode::E400, ErrorCode::E400]);
    }

    #[test]
    fn test_errors_in_check_order() {
        let cells = r#"<mxCell id="x" vertex="1"><mxGeometry x="5000" width="1"/></mxCell>
                       <mxCell id="e" edge="1" source="nowhere"/>
                       <mxCell id="x"/>"#;

        let result = validate(&document(cells));

        assert_eq!(
            codes(&result),
            vec![
                ErrorCode::E200,
                ErrorCode::E300,
                ErrorCode::E301,
                ErrorCode::E201,
                ErrorCode::E400,
            ]
        );
    }

    #[test]
    fn test_fatal_structure_stops_checks() {
        let result = validate("<mxfile><diagram/></mxfile>");

        assert_eq!(codes(&result), vec![ErrorCode::E102]);
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let cells = format!(
            r#"{VPC}{IGW}<mxCell vertex="1"><mxGeometry x="abc" width="10"/></mxCell>"#
        );

        let result = validate(&document(&cells));

        assert!(result.is_valid());
        assert!(result.has_code(ErrorCode::W001));
        assert!(result.has_code(ErrorCode::W002));
        assert_eq!(result.warnings().count(), 2);
    }

    #[test]
    fn test_extent_uses_numeric_prefix() {
        let cells = format!(
            r#"{VPC}{IGW}<mxCell id="wide" vertex="1"><mxGeometry x="2500px" width="800"/></mxCell>"#
        );

        let result = validate(&document(&cells));

        assert!(!result.is_valid());
        assert!(result.has_code(ErrorCode::E400));
        assert!(result.has_code(ErrorCode::W001));
    }

    #[test]
    fn test_unreadable_extent_is_not_checked() {
        let cells = format!(
            r#"{VPC}{IGW}<mxCell id="odd" vertex="1"><mxGeometry x="left" width="5000"/></mxCell>"#
        );

        let result = validate(&document(&cells));

        assert!(result.is_valid());
        assert!(result.has_code(ErrorCode::W001));
    }

    #[test]
    fn test_describe_markers() {
        assert_eq!(describe_markers(&["a".to_string()]), "`a`");
        assert_eq!(
            describe_markers(&["a".to_string(), "b".to_string()]),
            "any of `a`, `b`"
        );
    }
}
