//! Anchor documents and the evaluator factory built on them.
//!
//! A [`CurvePath`] is the serializable form of a curve as authored by an
//! editor: the kind of curve plus its ordered anchors. Calling
//! [`CurvePath::evaluator`] validates the anchors and builds the matching
//! [`AnchorCurve`].
//!
//! ```json
//! {
//!   "kind": "bezier",
//!   "up": [0.0, 1.0, 0.0],
//!   "anchors": [
//!     { "position": [0.0, 0.0, 0.0], "control_offset": [0.0, 0.0, 2.0] },
//!     { "position": [4.0, 0.0, 4.0], "control_offset": [-2.0, 0.0, 0.0], "scale": [2.0, 2.0, 1.0] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::Vec3;
use super::anchor::{BezierAnchor, TransformAnchor};
use super::bezier::{BezierCurveEvaluator, BezierOptions};
use super::evaluator::{AnchorCurve, CurveError};
use super::polyline::PolylineCurveEvaluator;

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("failed to parse curve document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid curve: {0}")]
    Curve(#[from] CurveError),
}

/// A curve description ready to be turned into an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurvePath {
    Bezier {
        #[serde(default = "default_up")]
        up: Vec3,
        anchors: Vec<BezierAnchor>,
    },
    Polyline {
        anchors: Vec<TransformAnchor>,
    },
}

impl CurvePath {
    #[must_use]
    pub fn bezier(up: Vec3, anchors: Vec<BezierAnchor>) -> Self {
        Self::Bezier { up, anchors }
    }

    #[must_use]
    pub fn polyline(anchors: Vec<TransformAnchor>) -> Self {
        Self::Polyline { anchors }
    }

    /// Parse a JSON curve document.
    ///
    /// # Errors
    /// Returns [`PathError::Parse`] for malformed JSON or missing fields.
    pub fn from_json(text: &str) -> Result<Self, PathError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    /// Returns [`PathError::Parse`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, PathError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn anchor_count(&self) -> usize {
        match self {
            Self::Bezier { anchors, .. } => anchors.len(),
            Self::Polyline { anchors } => anchors.len(),
        }
    }

    /// Build the evaluator for this path with default sampling.
    ///
    /// # Errors
    /// Rejects paths with fewer than two anchors and any anchor data the
    /// evaluator constructors reject.
    pub fn evaluator(&self) -> Result<AnchorCurve, CurveError> {
        self.evaluator_with_options(BezierOptions::default())
    }

    /// Like [`Self::evaluator`], with explicit Bezier sampling options.
    /// Polylines ignore `options`.
    ///
    /// # Errors
    /// See [`Self::evaluator`].
    pub fn evaluator_with_options(
        &self,
        options: BezierOptions,
    ) -> Result<AnchorCurve, CurveError> {
        let count = self.anchor_count();
        if count < 2 {
            return Err(CurveError::NotEnoughAnchors { count });
        }

        match self {
            Self::Bezier { up, anchors } => {
                BezierCurveEvaluator::with_options(*up, anchors, options).map(AnchorCurve::from)
            }
            Self::Polyline { anchors } => {
                PolylineCurveEvaluator::new(anchors).map(AnchorCurve::from)
            }
        }
    }
}

const fn default_up() -> Vec3 {
    Vec3::Y
}
