#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc
)]

//! Curve evaluation and mesh morphing.
//!
//! Curves are built from ordered anchors, either cubic Bezier anchors with a
//! symmetric handle or explicit transform anchors joined by straight lines.
//! Both evaluate a normalized parameter to a position, orientation and scale.
//! [`geom::morph_mesh`] uses such an evaluator to bend a mesh laid out along a
//! straight segment onto the curve.

pub mod geom;

pub use geom::{
    AnchorCurve, BezierAnchor, BezierCurveEvaluator, CurveEvaluator, CurvePath, GeomMesh,
    MorphSegment, PolylineCurveEvaluator, TransformAnchor, morph_mesh,
};
