//! Remap a mesh along a curve.
//!
//! Every vertex is projected onto a straight reference segment to get a
//! parameter `t`. The vertex offset from the matching point on the segment
//! (the base point) is then re-expressed in the frame the curve evaluator
//! returns for `t`: scaled, rotated, then translated.
//!
//! The base point is interpolated without clamping, whereas the evaluator
//! clamps `t`. A vertex beyond either end of the segment keeps only its
//! offset across the segment and lands in the plane of the curve's end frame.
//!
//! # Example
//!
//! ```ignore
//! use curve_morph::geom::{morph_mesh, MorphSegment, PolylineCurveEvaluator};
//!
//! let curve = PolylineCurveEvaluator::new(&anchors)?;
//! let (morphed, diag) = morph_mesh(&mesh, MorphSegment::default(), &curve)?;
//! ```

use serde::{Deserialize, Serialize};

use super::evaluator::CurveEvaluator;
use super::mesh::GeomMesh;
use super::{BBox, Point3, Tolerance, Vec3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MorphError {
    #[error("morph segment endpoints must be finite")]
    InvalidSegment,
    #[error("input mesh contains invalid geometry (NaN/Inf values)")]
    InvalidGeometry,
    #[error("input mesh is malformed: {0}")]
    InvalidMesh(String),
}

// ============================================================================
// Segment
// ============================================================================

/// Straight reference segment that is mapped onto the curve.
///
/// `start` corresponds to `t = 0` on the curve and `end` to `t = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorphSegment {
    pub start: Point3,
    pub end: Point3,
}

impl MorphSegment {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn direction(&self) -> Vec3 {
        self.end.sub_point(self.start)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        Tolerance::ZERO_LENGTH.is_zero_length(self.length())
    }

    /// Unclamped projection of `point` onto the segment, 0 at `start` and 1 at `end`.
    ///
    /// A zero-length segment maps every point to 0.
    #[must_use]
    pub fn parameter_of(&self, point: Point3) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let direction = self.direction();
        point.sub_point(self.start).dot(direction) / direction.length_squared()
    }

    /// Point on the segment line at `t`, extrapolating outside [0, 1].
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.start.lerp(self.end, t)
    }
}

impl Default for MorphSegment {
    /// Unit segment along Z centered on the origin.
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, -0.5), Point3::new(0.0, 0.0, 0.5))
    }
}

// ============================================================================
// Options and diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphOptions {
    /// Whether to recompute normals after morphing.
    pub recompute_normals: bool,
    /// Whether to recompute tangents after morphing (requires UVs).
    pub recompute_tangents: bool,
}

impl MorphOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            recompute_normals: true,
            recompute_tangents: true,
        }
    }

    /// Set whether to recompute normals after morphing.
    #[must_use]
    pub const fn recompute_normals(mut self, recompute: bool) -> Self {
        self.recompute_normals = recompute;
        self
    }

    /// Set whether to recompute tangents after morphing.
    #[must_use]
    pub const fn recompute_tangents(mut self, recompute: bool) -> Self {
        self.recompute_tangents = recompute;
        self
    }
}

impl Default for MorphOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MorphDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Minimum distance a vertex moved.
    pub min_displacement: f64,
    /// Maximum distance a vertex moved.
    pub max_displacement: f64,
    /// Average distance a vertex moved.
    pub avg_displacement: f64,
    /// Vertices whose segment parameter fell outside [0, 1].
    pub extrapolated_vertex_count: usize,
    /// Bounds of the morphed mesh.
    pub bounds: Option<BBox>,
    pub warnings: Vec<String>,
}

// ============================================================================
// Morph
// ============================================================================

/// Morph `mesh` along `evaluator` with [`MorphOptions::default`].
///
/// # Errors
/// See [`morph_mesh_with_options`].
pub fn morph_mesh<E>(
    mesh: &GeomMesh,
    segment: MorphSegment,
    evaluator: &E,
) -> Result<(GeomMesh, MorphDiagnostics), MorphError>
where
    E: CurveEvaluator + ?Sized,
{
    morph_mesh_with_options(mesh, segment, evaluator, MorphOptions::default())
}

/// Morph `mesh` along `evaluator`, returning a new mesh and diagnostics.
///
/// The source mesh is left untouched. Vertex order, indices and UVs are carried
/// over unchanged. An empty mesh is returned as-is with a warning.
///
/// # Errors
/// Returns an error if the segment is not finite, if a vertex holds NaN/Inf,
/// or if the mesh is structurally inconsistent.
pub fn morph_mesh_with_options<E>(
    mesh: &GeomMesh,
    segment: MorphSegment,
    evaluator: &E,
    options: MorphOptions,
) -> Result<(GeomMesh, MorphDiagnostics), MorphError>
where
    E: CurveEvaluator + ?Sized,
{
    if !segment.is_finite() {
        return Err(MorphError::InvalidSegment);
    }
    if mesh.has_invalid_vertices() {
        return Err(MorphError::InvalidGeometry);
    }
    mesh.validate().map_err(MorphError::InvalidMesh)?;

    let mut warnings = Vec::new();

    if mesh.is_empty() {
        warnings.push("mesh has no vertices; nothing to morph".to_string());
        let diagnostics = MorphDiagnostics {
            triangle_count: mesh.triangle_count(),
            warnings,
            ..Default::default()
        };
        return Ok((mesh.clone(), diagnostics));
    }

    if segment.is_degenerate() {
        log::warn!("morph segment has zero length; every vertex maps to the curve start");
        warnings.push("morph segment has zero length; all vertices use t = 0".to_string());
    }

    let morphed = morph_vertices(&mesh.positions, &segment, evaluator);

    let extrapolated_vertex_count = morphed.iter().filter(|v| v.extrapolated).count();
    let displacements: Vec<f64> = morphed.iter().map(|v| v.displacement).collect();
    let (min_displacement, max_displacement, avg_displacement) =
        compute_displacement_stats(&displacements);

    let mut result = GeomMesh {
        positions: morphed.into_iter().map(|v| v.position).collect(),
        indices: mesh.indices.clone(),
        uvs: mesh.uvs.clone(),
        normals: mesh.normals.clone(),
        tangents: mesh.tangents.clone(),
    };

    if options.recompute_normals {
        result.recompute_normals();
    } else if result.normals.is_some() {
        warnings.push(
            "normals preserved without recomputation; they may be stale after morphing"
                .to_string(),
        );
    }
    if options.recompute_tangents {
        result.recompute_tangents();
    } else if result.tangents.is_some() {
        warnings.push(
            "tangents preserved without recomputation; they may be stale after morphing"
                .to_string(),
        );
    }

    log::debug!(
        "morphed {} vertices ({} extrapolated), displacement {:.6}..{:.6}",
        result.vertex_count(),
        extrapolated_vertex_count,
        min_displacement,
        max_displacement
    );

    let diagnostics = MorphDiagnostics {
        vertex_count: result.vertex_count(),
        triangle_count: result.triangle_count(),
        min_displacement,
        max_displacement,
        avg_displacement,
        extrapolated_vertex_count,
        bounds: result.bounds(),
        warnings,
    };

    Ok((result, diagnostics))
}

// ============================================================================
// Internal helper functions
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct MorphedVertex {
    position: [f64; 3],
    displacement: f64,
    extrapolated: bool,
}

fn morph_vertex<E>(segment: &MorphSegment, evaluator: &E, position: [f64; 3]) -> MorphedVertex
where
    E: CurveEvaluator + ?Sized,
{
    let point = Point3::from_array(position);
    let t = segment.parameter_of(point);
    let base = segment.point_at(t);
    let frame = evaluator.evaluate(t);
    let moved = frame.transform_point(point.sub_point(base));

    MorphedVertex {
        position: moved.to_array(),
        displacement: moved.distance_to(point),
        extrapolated: !(0.0..=1.0).contains(&t),
    }
}

#[cfg(feature = "parallel")]
fn morph_vertices<E>(
    positions: &[[f64; 3]],
    segment: &MorphSegment,
    evaluator: &E,
) -> Vec<MorphedVertex>
where
    E: CurveEvaluator + ?Sized,
{
    positions
        .par_iter()
        .map(|&p| morph_vertex(segment, evaluator, p))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn morph_vertices<E>(
    positions: &[[f64; 3]],
    segment: &MorphSegment,
    evaluator: &E,
) -> Vec<MorphedVertex>
where
    E: CurveEvaluator + ?Sized,
{
    positions
        .iter()
        .map(|&p| morph_vertex(segment, evaluator, p))
        .collect()
}

/// Compute min, max, and average of displacement values.
fn compute_displacement_stats(displacements: &[f64]) -> (f64, f64, f64) {
    if displacements.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let (min_d, max_d, sum) = displacements.iter().fold(
        (f64::MAX, f64::MIN, 0.0),
        |(min_d, max_d, sum), &d| (min_d.min(d), max_d.max(d), sum + d),
    );
    (min_d, max_d, sum / displacements.len() as f64)
}
