//! Parsing and repair of `points` style values.
//!
//! The value is a nested array literal such as `[[0,0],[0.5,0],[1,0]]`.
//! Generated documents get it wrong in every possible way: coordinates out
//! of range, quoted or missing components, truncated brackets. The parser
//! here reads any array literal so [`repair_points_value`] can keep what is
//! usable.

use log::{debug, trace};
use winnow::{
    Parser as _,
    ascii::{float, multispace0, take_escaped},
    combinator::{alt, delimited, preceded, separated, terminated},
    error::{ContextError, ModalResult},
    token::{any, take_till},
};

use mxguard_core::points::PointSet;

/// Deepest array nesting accepted before treating the value as unusable.
const MAX_NESTING: usize = 32;

/// A value of the array literal grammar.
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
    Array(Vec<Literal>),
}

impl Literal {
    /// Returns the coordinates if this is exactly a two-number array.
    ///
    /// `NaN` and infinite coordinates make the pair unusable.
    fn as_pair(&self) -> Option<(f64, f64)> {
        match self {
            Literal::Array(items) => match items.as_slice() {
                [Literal::Number(x), Literal::Number(y)] if x.is_finite() && y.is_finite() => {
                    Some((*x, *y))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

type IResult<O> = ModalResult<O, ContextError>;

fn number(input: &mut &str) -> IResult<Literal> {
    float.map(Literal::Number).parse_next(input)
}

/// A quoted string; backslash escapes are kept as written.
fn text(input: &mut &str) -> IResult<Literal> {
    alt((
        delimited('"', take_escaped(take_till(1.., ['"', '\\']), '\\', any), '"'),
        delimited(
            '\'',
            take_escaped(take_till(1.., ['\'', '\\']), '\\', any),
            '\'',
        ),
    ))
    .map(|s: &str| Literal::Text(s.to_string()))
    .parse_next(input)
}

fn keyword(input: &mut &str) -> IResult<Literal> {
    alt((
        "true".value(Literal::Bool(true)),
        "false".value(Literal::Bool(false)),
        "null".value(Literal::Null),
    ))
    .parse_next(input)
}

fn array(input: &mut &str) -> IResult<Literal> {
    delimited(
        '[',
        separated(0.., literal, ','),
        preceded(multispace0, ']'),
    )
    .map(Literal::Array)
    .parse_next(input)
}

/// Parse one literal with surrounding whitespace.
fn literal(input: &mut &str) -> IResult<Literal> {
    delimited(
        multispace0,
        alt((array, text, keyword, number)),
        multispace0,
    )
    .parse_next(input)
}

/// Parse a complete value, rejecting trailing input.
fn parse_literal(value: &str) -> Option<Literal> {
    if nesting_depth(value) > MAX_NESTING {
        debug!("Points value nested too deeply");
        return None;
    }

    terminated(literal, multispace0).parse(value).ok()
}

/// Maximum bracket depth, ignoring brackets inside quotes.
fn nesting_depth(value: &str) -> usize {
    let mut depth = 0usize;
    let mut max_depth = 0;
    let mut quote = None;
    let mut escaped = false;

    for c in value.chars() {
        match (quote, c) {
            (Some(_), _) if escaped => escaped = false,
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            (None, ']') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    max_depth
}

/// Repairs a `points` style value so every coordinate lies in `[0, 1]`.
///
/// Values that do not parse as an array literal, or parse to something other
/// than an array, become the canonical 16-point unit-square perimeter. Arrays
/// keep only their two-number entries with finite coordinates, each clamped
/// into `[0, 1]`, in the original order. An array with no usable entry also
/// becomes the canonical set.
///
/// Never fails.
///
/// # Example
///
/// ```
/// # use mxguard_parser::repair_points_value;
/// assert_eq!(
///     repair_points_value(r#"[[-0.1,0.5],[1.5,2],[0.3,"x"]]"#),
///     "[[0,0.5],[1,1]]"
/// );
/// ```
pub fn repair_points_value(value: &str) -> String {
    let repaired = match parse_literal(value) {
        Some(Literal::Array(items)) => {
            PointSet::clamped_or_canonical(items.iter().filter_map(Literal::as_pair))
        }
        Some(other) => {
            debug!(value; "Points value is not an array, using canonical points");
            trace!(literal:? = other; "Rejected points literal");
            PointSet::canonical()
        }
        None => {
            debug!(value; "Points value does not parse, using canonical points");
            PointSet::canonical()
        }
    };

    repaired.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "[[0,0],[0.25,0],[0.5,0],[0.75,0],[1,0],[1,0.25],[1,0.5],[1,0.75],\
                             [1,1],[0.75,1],[0.5,1],[0.25,1],[0,1],[0,0.75],[0,0.5],[0,0.25]]";

    #[test]
    fn test_parse_nested_array() {
        let parsed = parse_literal(" [ [0, 1.5] , [\"a\", true, null] , [] ] ");

        assert_eq!(
            parsed,
            Some(Literal::Array(vec![
                Literal::Array(vec![Literal::Number(0.0), Literal::Number(1.5)]),
                Literal::Array(vec![
                    Literal::Text("a".to_string()),
                    Literal::Bool(true),
                    Literal::Null,
                ]),
                Literal::Array(vec![]),
            ]))
        );
    }

    #[test]
    fn test_parse_rejects_trailing_input() {
        assert_eq!(parse_literal("[[0,0]] extra"), None);
        assert_eq!(parse_literal("[[0,0]"), None);
        assert_eq!(parse_literal("not-json"), None);
    }

    #[test]
    fn test_clamps_and_drops_non_numeric_pairs() {
        assert_eq!(
            repair_points_value(r#"[[-0.1,0.5],[1.5,2],[0.3,"x"]]"#),
            "[[0,0.5],[1,1]]"
        );
    }

    #[test]
    fn test_in_range_value_is_kept() {
        assert_eq!(
            repair_points_value("[[0,0],[0.5,0],[1,0.25]]"),
            "[[0,0],[0.5,0],[1,0.25]]"
        );
    }

    #[test]
    fn test_unparsable_value_uses_canonical() {
        assert_eq!(repair_points_value("not-json"), CANONICAL);
    }

    #[test]
    fn test_non_array_value_uses_canonical() {
        assert_eq!(repair_points_value("0.5"), CANONICAL);
        assert_eq!(repair_points_value("\"[[0,0]]\""), CANONICAL);
    }

    #[test]
    fn test_no_usable_pair_uses_canonical() {
        assert_eq!(repair_points_value("[]"), CANONICAL);
        assert_eq!(repair_points_value("[[0],[1,2,3],[null,1]]"), CANONICAL);
    }

    #[test]
    fn test_nan_components_are_dropped() {
        assert_eq!(repair_points_value("[[NaN,0.5],[0.5,0.5]]"), "[[0.5,0.5]]");
    }

    #[test]
    fn test_deep_nesting_uses_canonical() {
        let deep = format!("{}{}", "[".repeat(500), "]".repeat(500));

        assert_eq!(repair_points_value(&deep), CANONICAL);
    }

    #[test]
    fn test_infinite_components_are_dropped() {
        assert_eq!(
            repair_points_value("[[inf,0.5],[Infinity,1],[-inf,0],[0.5,0.5]]"),
            "[[0.5,0.5]]"
        );
        assert_eq!(repair_points_value("[[0,Infinity]]"), CANONICAL);
    }

    #[test]
    fn test_escaped_quotes_drop_only_their_pair() {
        assert_eq!(
            repair_points_value(r#"[["a\"b",1],['it\'s',0],[0.5,0.5]]"#),
            "[[0.5,0.5]]"
        );
        assert_eq!(
            parse_literal(r#""x\"y""#),
            Some(Literal::Text(r#"x\"y"#.to_string()))
        );
    }

    #[test]
    fn test_nesting_depth_ignores_quoted_brackets() {
        assert_eq!(nesting_depth(r#"[["[[[",1]]"#), 2);
        assert_eq!(nesting_depth(r#"[["\"[[[",1]]"#), 2);
    }
}
