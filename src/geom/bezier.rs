//! Cubic Bezier splines with piecewise arc-length reparameterization.
//!
//! Each pair of consecutive [`BezierAnchor`]s forms one cubic segment:
//! `[a.position, a.left_control_point(), b.right_control_point(), b.position]`.
//! Segment lengths are approximated by summing chords between equally spaced
//! samples, and the cumulative length reached at every anchor is stored in a
//! [`LookupTable`]. Evaluation maps `t` to a target length, finds the segment
//! holding it and treats length as linear in the segment's local parameter.
//!
//! Orientation is not authored: it is derived from a finite-difference tangent
//! and the evaluator's up vector.

use super::anchor::{BezierAnchor, TransformAnchor};
use super::evaluator::{CurveError, CurveEvaluator, clamp_parameter, ensure_anchor_count};
use super::lookup::{Bracket, LookupTable};
use super::{Point3, Quat, Tolerance, Vec3};

/// Chord samples per segment when approximating arc length.
pub const DEFAULT_ARC_STEPS: usize = 16;

/// Local parameter offset used for the finite-difference tangent.
pub const DEFAULT_TANGENT_STEP: f64 = 1e-4;

// ============================================================================
// Options
// ============================================================================

/// Sampling settings for [`BezierCurveEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierOptions {
    /// Number of chords summed per segment.
    pub arc_steps: usize,
    /// Parameter step for the tangent difference quotient.
    pub tangent_step: f64,
}

impl BezierOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arc_steps: DEFAULT_ARC_STEPS,
            tangent_step: DEFAULT_TANGENT_STEP,
        }
    }

    #[must_use]
    pub const fn arc_steps(mut self, steps: usize) -> Self {
        self.arc_steps = steps;
        self
    }

    #[must_use]
    pub const fn tangent_step(mut self, step: f64) -> Self {
        self.tangent_step = step;
        self
    }

    fn validate(&self) -> Result<(), CurveError> {
        if self.arc_steps == 0 {
            return Err(CurveError::InvalidArcSteps);
        }
        if !self.tangent_step.is_finite() || self.tangent_step <= 0.0 || self.tangent_step >= 1.0 {
            return Err(CurveError::InvalidTangentStep);
        }
        Ok(())
    }
}

impl Default for BezierOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Evaluator
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurveEvaluator {
    up: Vec3,
    lookup: LookupTable<BezierAnchor>,
    arc_length: f64,
    options: BezierOptions,
}

impl BezierCurveEvaluator {
    /// Build an evaluator with [`BezierOptions::default`].
    ///
    /// # Errors
    /// Fails when fewer than two anchors are given, when any anchor holds a
    /// non-finite value, or when `up` cannot be normalized.
    pub fn new(up: Vec3, anchors: &[BezierAnchor]) -> Result<Self, CurveError> {
        Self::with_options(up, anchors, BezierOptions::default())
    }

    /// Build an evaluator with explicit sampling options.
    ///
    /// # Errors
    /// Same as [`Self::new`], plus invalid `options`.
    pub fn with_options(
        up: Vec3,
        anchors: &[BezierAnchor],
        options: BezierOptions,
    ) -> Result<Self, CurveError> {
        options.validate()?;
        ensure_anchor_count(anchors.len())?;
        if let Some(index) = anchors.iter().position(|anchor| !anchor.is_finite()) {
            return Err(CurveError::NonFiniteAnchor { index });
        }
        let up = up
            .normalized()
            .filter(|v| v.is_finite())
            .ok_or(CurveError::InvalidUpVector)?;

        let mut lookup = LookupTable::with_capacity(anchors.len());
        let mut arc_length = 0.0;
        lookup.push(arc_length, anchors[0]);
        for pair in anchors.windows(2) {
            let controls = segment_controls(&pair[0], &pair[1]);
            arc_length += segment_length(&controls, options.arc_steps);
            lookup.push(arc_length, pair[1]);
        }

        if Tolerance::ZERO_LENGTH.is_zero_length(arc_length) {
            log::warn!(
                "bezier curve with {} anchors has zero arc length; evaluating by anchor index",
                anchors.len()
            );
        }
        log::debug!(
            "bezier curve built: {} anchors, {} arc steps, arc length {:.6}",
            anchors.len(),
            options.arc_steps,
            arc_length
        );

        Ok(Self {
            up,
            lookup,
            arc_length,
            options,
        })
    }

    /// Normalized up vector used to derive orientation.
    #[must_use]
    pub const fn up(&self) -> Vec3 {
        self.up
    }

    /// Approximate arc length over all segments.
    #[must_use]
    pub const fn arc_length(&self) -> f64 {
        self.arc_length
    }

    #[must_use]
    pub const fn lookup(&self) -> &LookupTable<BezierAnchor> {
        &self.lookup
    }

    #[must_use]
    pub const fn options(&self) -> BezierOptions {
        self.options
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.lookup.len().saturating_sub(1)
    }

    fn bracket(&self, t: f64) -> Bracket {
        if Tolerance::ZERO_LENGTH.is_zero_length(self.arc_length) {
            self.lookup.bracket_by_index(t)
        } else {
            self.lookup.bracket(t * self.arc_length)
        }
    }

    /// Unit tangent at local parameter `t` of the segment `controls`.
    ///
    /// Steps forward by `tangent_step` and backward once the step would leave
    /// the segment. A vanishing difference falls back to the analytic
    /// derivative, then the segment chord, then +Z.
    fn tangent(&self, controls: &[Point3; 4], t: f64, at: Point3) -> Vec3 {
        let step = self.options.tangent_step;
        let difference = if t + step <= 1.0 {
            cubic_point(controls, t + step).sub_point(at)
        } else {
            at.sub_point(cubic_point(controls, t - step))
        };

        [
            difference,
            cubic_derivative(controls, t),
            controls[3].sub_point(controls[0]),
        ]
        .into_iter()
        .filter(|v| v.length() > Tolerance::ZERO_LENGTH.eps)
        .find_map(Vec3::normalized)
        .unwrap_or(Vec3::Z)
    }
}

impl CurveEvaluator for BezierCurveEvaluator {
    fn evaluate(&self, t: f64) -> TransformAnchor {
        let bracket = self.bracket(clamp_parameter(t));
        let nodes = self.lookup.nodes();
        let start = nodes[bracket.lower].content();
        let end = nodes[bracket.upper].content();

        let controls = segment_controls(start, end);
        let local_t = bracket.fraction;
        let position = cubic_point(&controls, local_t);
        let tangent = self.tangent(&controls, local_t, position);

        TransformAnchor::new(
            position,
            Quat::look_rotation(tangent, self.up),
            start.scale.lerp(end.scale, local_t),
        )
    }

    fn total_length(&self) -> f64 {
        self.arc_length
    }

    fn anchor_count(&self) -> usize {
        self.lookup.len()
    }
}

// ============================================================================
// Cubic helpers
// ============================================================================

pub(crate) fn segment_controls(start: &BezierAnchor, end: &BezierAnchor) -> [Point3; 4] {
    [
        start.position,
        start.left_control_point(),
        end.right_control_point(),
        end.position,
    ]
}

/// De Casteljau evaluation; reproduces `c[0]` at 0 and `c[3]` at 1 exactly.
pub(crate) fn cubic_point(c: &[Point3; 4], t: f64) -> Point3 {
    let a = c[0].lerp(c[1], t);
    let b = c[1].lerp(c[2], t);
    let d = c[2].lerp(c[3], t);
    a.lerp(b, t).lerp(b.lerp(d, t), t)
}

fn cubic_derivative(c: &[Point3; 4], t: f64) -> Vec3 {
    let s = 1.0 - t;
    c[1].sub_point(c[0]).mul_scalar(3.0 * s * s)
        + c[2].sub_point(c[1]).mul_scalar(6.0 * s * t)
        + c[3].sub_point(c[2]).mul_scalar(3.0 * t * t)
}

/// Sum of chords between `steps + 1` equally spaced samples, ends included.
fn segment_length(c: &[Point3; 4], steps: usize) -> f64 {
    let mut length = 0.0;
    let mut previous = c[0];
    for j in 1..=steps {
        let sample = cubic_point(c, j as f64 / steps as f64);
        length += sample.distance_to(previous);
        previous = sample;
    }
    length
}
