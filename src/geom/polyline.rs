//! Piecewise-linear curves through explicit transform anchors.

use super::Tolerance;
use super::anchor::TransformAnchor;
use super::evaluator::{CurveError, CurveEvaluator, clamp_parameter, ensure_anchor_count};
use super::lookup::{Bracket, LookupTable};

/// Polyline evaluator.
///
/// Cumulative distances between anchor positions form the lookup table.
/// Orientation comes from the anchors themselves and is slerped between the
/// bracketing pair, while position and scale are interpolated linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineCurveEvaluator {
    lookup: LookupTable<TransformAnchor>,
    length: f64,
}

impl PolylineCurveEvaluator {
    /// Anchor rotations are stored normalized, so a scaled quaternion yields
    /// the same frames as its unit counterpart.
    ///
    /// # Errors
    /// Fails when fewer than two anchors are given, when an anchor holds a
    /// non-finite value, or when an anchor rotation has zero length.
    pub fn new(anchors: &[TransformAnchor]) -> Result<Self, CurveError> {
        ensure_anchor_count(anchors.len())?;
        let mut unit_anchors = Vec::with_capacity(anchors.len());
        for (index, anchor) in anchors.iter().enumerate() {
            if !anchor.is_finite() {
                return Err(CurveError::NonFiniteAnchor { index });
            }
            let rotation = anchor
                .rotation
                .normalized()
                .ok_or(CurveError::DegenerateRotation { index })?;
            unit_anchors.push(anchor.with_rotation(rotation));
        }

        let mut lookup = LookupTable::with_capacity(unit_anchors.len());
        let mut length = 0.0;
        lookup.push(length, unit_anchors[0]);
        for pair in unit_anchors.windows(2) {
            length += pair[1].position.distance_to(pair[0].position);
            lookup.push(length, pair[1]);
        }

        if Tolerance::ZERO_LENGTH.is_zero_length(length) {
            log::warn!(
                "polyline with {} anchors has zero length; evaluating by anchor index",
                anchors.len()
            );
        }
        log::debug!(
            "polyline built: {} anchors, length {:.6}",
            anchors.len(),
            length
        );

        Ok(Self { lookup, length })
    }

    /// Sum of the distances between consecutive anchors.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub const fn lookup(&self) -> &LookupTable<TransformAnchor> {
        &self.lookup
    }

    fn bracket(&self, t: f64) -> Bracket {
        if Tolerance::ZERO_LENGTH.is_zero_length(self.length) {
            self.lookup.bracket_by_index(t)
        } else {
            self.lookup.bracket(t * self.length)
        }
    }
}

impl CurveEvaluator for PolylineCurveEvaluator {
    fn evaluate(&self, t: f64) -> TransformAnchor {
        let bracket = self.bracket(clamp_parameter(t));
        let nodes = self.lookup.nodes();
        let start = nodes[bracket.lower].content();
        let end = nodes[bracket.upper].content();
        let local_t = bracket.fraction;

        TransformAnchor::new(
            start.position.lerp(end.position, local_t),
            start.rotation.slerp(end.rotation, local_t),
            start.scale.lerp(end.scale, local_t),
        )
    }

    fn total_length(&self) -> f64 {
        self.length
    }

    fn anchor_count(&self) -> usize {
        self.lookup.len()
    }
}
