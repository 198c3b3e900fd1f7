//! Length-indexed lookup tables shared by the curve evaluators.
//!
//! A table is a list of [`LookupNode`]s whose cumulative values never decrease.
//! It is filled once while an evaluator is built and only read afterwards.

use super::Tolerance;

/// A cumulative value paired with the anchor reached at that value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupNode<T> {
    value: f64,
    content: T,
}

impl<T> LookupNode<T> {
    #[must_use]
    pub const fn new(value: f64, content: T) -> Self {
        Self { value, content }
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub const fn content(&self) -> &T {
        &self.content
    }
}

/// The pair of nodes enclosing a lookup value, plus the local fraction between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lower: usize,
    pub upper: usize,
    /// Position between `lower` (0.0) and `upper` (1.0).
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable<T> {
    nodes: Vec<LookupNode<T>>,
}

impl<T> LookupTable<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, value: f64, content: T) {
        debug_assert!(
            self.nodes.last().is_none_or(|last| last.value <= value),
            "lookup values must be non-decreasing"
        );
        self.nodes.push(LookupNode::new(value, content));
    }

    #[must_use]
    pub fn nodes(&self) -> &[LookupNode<T>] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LookupNode<T>> {
        self.nodes.get(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&LookupNode<T>> {
        self.nodes.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&LookupNode<T>> {
        self.nodes.last()
    }

    /// Cumulative value of the last node (0.0 for an empty table).
    #[must_use]
    pub fn total(&self) -> f64 {
        self.nodes.last().map_or(0.0, |node| node.value)
    }

    /// Index of the first node whose value is strictly greater than `target`,
    /// clamped to `[1, len - 1]` so it always names a valid upper bracket.
    ///
    /// Requires at least two nodes.
    #[must_use]
    pub fn upper_index(&self, target: f64) -> usize {
        let last = self.nodes.len().saturating_sub(1);
        self.nodes
            .partition_point(|node| node.value <= target)
            .clamp(1, last.max(1))
    }

    /// Bracket `target` between two neighbouring nodes.
    ///
    /// Targets at or below the first value always resolve to the first
    /// segment at fraction 0, so the first anchor is reproduced even when
    /// leading segments have zero length. Equal bracket values resolve to
    /// fraction 1 when the target has reached them, 0 otherwise.
    ///
    /// Requires at least two nodes.
    #[must_use]
    pub fn bracket(&self, target: f64) -> Bracket {
        let first = self.nodes.first().map_or(0.0, |node| node.value);
        if target <= first {
            return Bracket {
                lower: 0,
                upper: 1,
                fraction: 0.0,
            };
        }

        let upper = self.upper_index(target);
        let lower = upper - 1;
        let start = self.nodes[lower].value;
        let end = self.nodes[upper].value;
        let span = end - start;

        let fraction = if Tolerance::ZERO_LENGTH.is_zero_length(span) {
            if target >= end { 1.0 } else { 0.0 }
        } else {
            ((target - start) / span).clamp(0.0, 1.0)
        };

        Bracket {
            lower,
            upper,
            fraction,
        }
    }

    /// Bracket a normalized parameter by node index instead of by value.
    ///
    /// Used when every cumulative value is zero and lengths carry no information.
    #[must_use]
    pub fn bracket_by_index(&self, t: f64) -> Bracket {
        let segments = self.nodes.len().saturating_sub(1).max(1);
        let scaled = t.clamp(0.0, 1.0) * segments as f64;
        let lower = (scaled.floor() as usize).min(segments - 1);
        Bracket {
            lower,
            upper: lower + 1,
            fraction: (scaled - lower as f64).clamp(0.0, 1.0),
        }
    }
}
