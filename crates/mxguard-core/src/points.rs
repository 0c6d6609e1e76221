//! Normalized connection point sets.
//!
//! Container shapes declare where edges may attach through the `points`
//! style property: a polygon of `[x, y]` pairs in unit coordinates, e.g.
//! `points=[[0,0],[0.5,0],[1,0]]`. Every coordinate must lie in `[0, 1]`.
//!
//! [`PointSet::clamped`] builds a set that satisfies that range from arbitrary
//! pairs, and [`PointSet::canonical`] is the fallback used when nothing usable
//! survives.

use std::fmt;

/// Style property holding a container's connection points.
pub const POINTS_KEY: &str = "points";

/// A point in normalized unit coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a point without range checks.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the horizontal coordinate.
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the vertical coordinate.
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns `true` if neither coordinate is NaN.
    pub fn is_numeric(self) -> bool {
        !self.x.is_nan() && !self.y.is_nan()
    }

    /// Returns `true` if both coordinates lie in `[0, 1]`.
    pub fn is_normalized(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Clamps each coordinate independently into `[0, 1]`.
    ///
    /// Must not be called with NaN coordinates.
    pub fn clamped(self) -> Self {
        Self::new(clamp_unit(self.x), clamp_unit(self.y))
    }
}

/// Clamps into `[0, 1]`, folding `-0.0` into `0.0`.
fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0) + 0.0
}

/// An ordered sequence of points tracing a polygon boundary.
///
/// Order is significant and preserved by every operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    /// Creates a point set from points as given.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// The unit-square perimeter traced clockwise from the top-left corner
    /// in quarter steps, 16 points in total.
    pub fn canonical() -> Self {
        const STEPS: [f64; 4] = [0.0, 0.25, 0.5, 0.75];

        let top = STEPS.iter().map(|&t| Point::new(t, 0.0));
        let right = STEPS.iter().map(|&t| Point::new(1.0, t));
        let bottom = STEPS.iter().map(|&t| Point::new(1.0 - t, 1.0));
        let left = STEPS.iter().map(|&t| Point::new(0.0, 1.0 - t));

        Self::new(top.chain(right).chain(bottom).chain(left).collect())
    }

    /// Builds a normalized set from raw coordinate pairs.
    ///
    /// Pairs with a NaN component are dropped; the rest are clamped into
    /// `[0, 1]` in their original order. The result may be empty.
    pub fn clamped(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(x, y)| Point::new(x, y))
                .filter(|point| point.is_numeric())
                .map(Point::clamped)
                .collect(),
        )
    }

    /// Like [`PointSet::clamped`], falling back to [`PointSet::canonical`]
    /// when no pair survives.
    pub fn clamped_or_canonical(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let set = Self::clamped(pairs);
        if set.is_empty() {
            Self::canonical()
        } else {
            set
        }
    }

    /// Returns the points in order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the set has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if every point lies in the unit square.
    pub fn is_normalized(&self) -> bool {
        self.points.iter().all(|point| point.is_normalized())
    }
}

/// Formats in nested-array notation: `[[0,0.5],[1,1]]`.
impl fmt::Display for PointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, point) in self.points.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "[{},{}]", point.x, point.y)?;
        }
        write!(f, "]")
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    /// Every clamped coordinate lies in the unit interval.
    fn check_clamped_is_normalized(pairs: &[(f64, f64)]) -> Result<(), TestCaseError> {
        let set = PointSet::clamped_or_canonical(pairs.iter().copied());
        prop_assert!(!set.is_empty());
        prop_assert!(set.is_normalized(), "not normalized: {set}");
        Ok(())
    }

    /// Clamping never reorders or drops numeric pairs.
    fn check_clamped_preserves_order(pairs: &[(f64, f64)]) -> Result<(), TestCaseError> {
        let set = PointSet::clamped(pairs.iter().copied());
        prop_assert_eq!(set.len(), pairs.len());
        for (point, (x, y)) in set.points().iter().zip(pairs) {
            prop_assert_eq!(point.x(), x.clamp(0.0, 1.0) + 0.0);
            prop_assert_eq!(point.y(), y.clamp(0.0, 1.0) + 0.0);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn clamped_is_normalized(pairs in prop::collection::vec((any::<f64>(), any::<f64>()), 0..20)) {
            check_clamped_is_normalized(&pairs)?;
        }

        #[test]
        fn clamped_preserves_order(pairs in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 0..20)) {
            check_clamped_preserves_order(&pairs)?;
        }
    }
}
