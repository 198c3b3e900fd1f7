//! Curve evaluation contract.
//!
//! A curve evaluator maps a normalized parameter `t` onto a [`TransformAnchor`].
//! Evaluators are immutable once built, so they can be shared across threads
//! and queried concurrently.

use super::anchor::TransformAnchor;
use super::bezier::BezierCurveEvaluator;
use super::polyline::PolylineCurveEvaluator;

/// Errors raised while building a curve evaluator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("curve requires at least 2 anchors, got {count}")]
    NotEnoughAnchors { count: usize },
    #[error("anchor {index} contains non-finite values")]
    NonFiniteAnchor { index: usize },
    #[error("anchor {index} has a zero-length rotation")]
    DegenerateRotation { index: usize },
    #[error("up vector must be finite and non-zero")]
    InvalidUpVector,
    #[error("arc length sampling requires at least one step")]
    InvalidArcSteps,
    #[error("tangent step must be finite and positive")]
    InvalidTangentStep,
}

/// Evaluate a curve at a normalized parameter.
pub trait CurveEvaluator: Send + Sync {
    /// Position, orientation and scale at `t`.
    ///
    /// `t` is clamped to `[0, 1]`; out-of-range values are never rejected.
    fn evaluate(&self, t: f64) -> TransformAnchor;

    /// Total length used to map `t` onto the curve.
    fn total_length(&self) -> f64;

    fn anchor_count(&self) -> usize;
}

impl<E: CurveEvaluator + ?Sized> CurveEvaluator for &E {
    fn evaluate(&self, t: f64) -> TransformAnchor {
        (**self).evaluate(t)
    }

    fn total_length(&self) -> f64 {
        (**self).total_length()
    }

    fn anchor_count(&self) -> usize {
        (**self).anchor_count()
    }
}

/// One of the built-in evaluators, dispatched by `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorCurve {
    Bezier(BezierCurveEvaluator),
    Polyline(PolylineCurveEvaluator),
}

impl CurveEvaluator for AnchorCurve {
    fn evaluate(&self, t: f64) -> TransformAnchor {
        match self {
            Self::Bezier(curve) => curve.evaluate(t),
            Self::Polyline(curve) => curve.evaluate(t),
        }
    }

    fn total_length(&self) -> f64 {
        match self {
            Self::Bezier(curve) => curve.total_length(),
            Self::Polyline(curve) => curve.total_length(),
        }
    }

    fn anchor_count(&self) -> usize {
        match self {
            Self::Bezier(curve) => curve.anchor_count(),
            Self::Polyline(curve) => curve.anchor_count(),
        }
    }
}

impl From<BezierCurveEvaluator> for AnchorCurve {
    fn from(curve: BezierCurveEvaluator) -> Self {
        Self::Bezier(curve)
    }
}

impl From<PolylineCurveEvaluator> for AnchorCurve {
    fn from(curve: PolylineCurveEvaluator) -> Self {
        Self::Polyline(curve)
    }
}

pub(crate) fn clamp_parameter(t: f64) -> f64 {
    // NaN resolves to the start of the curve.
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

pub(crate) fn ensure_anchor_count(count: usize) -> Result<(), CurveError> {
    if count < 2 {
        return Err(CurveError::NotEnoughAnchors { count });
    }
    Ok(())
}
