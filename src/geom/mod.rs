mod anchor;
mod bezier;
mod core;
mod evaluator;
mod lookup;
mod mesh;
mod morph;
mod path;
mod placement;
mod polyline;

pub use anchor::{BezierAnchor, TransformAnchor};
pub use bezier::{BezierCurveEvaluator, BezierOptions, DEFAULT_ARC_STEPS, DEFAULT_TANGENT_STEP};
pub use core::{BBox, Point3, Quat, Tolerance, Vec3};
pub use evaluator::{AnchorCurve, CurveError, CurveEvaluator};
pub use lookup::{Bracket, LookupNode, LookupTable};
pub use mesh::GeomMesh;
pub use morph::{
    MorphDiagnostics, MorphError, MorphOptions, MorphSegment, morph_mesh,
    morph_mesh_with_options,
};
pub use path::{CurvePath, PathError};
pub use placement::{distribute_along_curve, placement_parameters};
pub use polyline::PolylineCurveEvaluator;

#[cfg(test)]
mod tests;
