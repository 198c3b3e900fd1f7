//! Evenly spaced frames along a curve, for placing copies of an object.

use super::anchor::TransformAnchor;
use super::evaluator::CurveEvaluator;

/// Parameters for `count` instances spread from the start to the end of a curve.
///
/// `count` is raised to at least one. A single instance sits at `t = 0`;
/// otherwise instance `i` sits at `i / (count - 1)`, so both ends are covered.
#[must_use]
pub fn placement_parameters(count: usize) -> Vec<f64> {
    let count = count.max(1);
    if count == 1 {
        return vec![0.0];
    }
    let last = (count - 1) as f64;
    (0..count).map(|i| i as f64 / last).collect()
}

/// Evaluate `evaluator` at every [`placement_parameters`] value.
#[must_use]
pub fn distribute_along_curve<E>(evaluator: &E, count: usize) -> Vec<TransformAnchor>
where
    E: CurveEvaluator + ?Sized,
{
    placement_parameters(count)
        .into_iter()
        .map(|t| evaluator.evaluate(t))
        .collect()
}
