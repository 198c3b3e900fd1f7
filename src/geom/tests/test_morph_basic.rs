//! Tests for morphing meshes along curves.

use crate::geom::{
    BezierAnchor, BezierCurveEvaluator, CurveEvaluator, GeomMesh, MorphError, MorphOptions,
    MorphSegment, Point3, PolylineCurveEvaluator, Quat, Tolerance, TransformAnchor, Vec3,
    morph_mesh, morph_mesh_with_options,
};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_PI_2;

// ============================================================================
// Test mesh and curve factories
// ============================================================================

/// Box spanning `[-0.25, 0.25]` in X/Y and `[-0.5, 0.5]` in Z, split into
/// `rings` slices along Z so it can bend. Side faces only.
fn create_test_column(rings: usize) -> GeomMesh {
    let corners = [[-0.25, -0.25], [0.25, -0.25], [0.25, 0.25], [-0.25, 0.25]];
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    for ring in 0..=rings {
        let v = ring as f64 / rings as f64;
        for (i, c) in corners.iter().enumerate() {
            positions.push([c[0], c[1], v - 0.5]);
            uvs.push([i as f64 / 4.0, v]);
        }
    }

    let mut indices = Vec::new();
    for ring in 0..rings as u32 {
        for side in 0..4u32 {
            let a = ring * 4 + side;
            let b = ring * 4 + (side + 1) % 4;
            let c = b + 4;
            let d = a + 4;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    GeomMesh::with_attributes(positions, indices, Some(uvs), None)
}

/// Polyline running straight along the default segment.
fn identity_line() -> PolylineCurveEvaluator {
    let segment = MorphSegment::default();
    PolylineCurveEvaluator::new(&[
        TransformAnchor::at(segment.start),
        TransformAnchor::at(segment.end),
    ])
    .unwrap()
}

fn assert_position(actual: [f64; 3], expected: [f64; 3], eps: f64) {
    let (a, b) = (Point3::from_array(actual), Point3::from_array(expected));
    assert!(
        Tolerance::new(eps).approx_eq_point3(a, b),
        "{actual:?} != {expected:?} (eps {eps})"
    );
}

// ============================================================================
// Segment
// ============================================================================

#[test]
fn segment_parameter_is_unclamped_projection() {
    let segment = MorphSegment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 2.0));
    assert_eq!(segment.parameter_of(Point3::new(5.0, -1.0, 1.0)), 0.5);
    assert_eq!(segment.parameter_of(Point3::new(0.0, 0.0, -2.0)), -1.0);
    assert_eq!(segment.parameter_of(Point3::new(0.0, 0.0, 6.0)), 3.0);
    assert_eq!(segment.point_at(1.5), Point3::new(0.0, 0.0, 3.0));

    let collapsed = MorphSegment::new(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0));
    assert!(collapsed.is_degenerate());
    assert_eq!(collapsed.parameter_of(Point3::new(4.0, 4.0, 4.0)), 0.0);
}

#[test]
fn default_segment_is_unit_z() {
    let segment = MorphSegment::default();
    assert_eq!(segment.start, Point3::new(0.0, 0.0, -0.5));
    assert_eq!(segment.end, Point3::new(0.0, 0.0, 0.5));
    assert_eq!(segment.length(), 1.0);
}

// ============================================================================
// Morph
// ============================================================================

#[test]
fn identity_anchor_at_midpoint_keeps_vertex() {
    // The curve maps t = 0.5 to the origin with identity rotation and unit scale.
    let curve = PolylineCurveEvaluator::new(&[
        TransformAnchor::at(Point3::new(0.0, 0.0, -3.0)),
        TransformAnchor::at(Point3::new(0.0, 0.0, 3.0)),
    ])
    .unwrap();
    let mid = curve.evaluate(0.5);
    assert_eq!(mid.position, Point3::ORIGIN);

    let mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0], [0.3, -0.2, 0.0]], Vec::new());
    let (morphed, diag) = morph_mesh(&mesh, MorphSegment::default(), &curve).unwrap();

    assert_position(morphed.positions[0], [0.0, 0.0, 0.0], 1e-12);
    assert_position(morphed.positions[1], [0.3, -0.2, 0.0], 1e-12);
    assert_eq!(diag.extrapolated_vertex_count, 0);
}

#[test]
fn curve_along_segment_leaves_mesh_unchanged() {
    let mesh = create_test_column(4);
    let (morphed, diag) = morph_mesh(&mesh, MorphSegment::default(), &identity_line()).unwrap();

    assert_eq!(morphed.vertex_count(), mesh.vertex_count());
    assert_eq!(morphed.indices, mesh.indices);
    assert_eq!(morphed.uvs, mesh.uvs);
    for (a, b) in morphed.positions.iter().zip(&mesh.positions) {
        assert_position(*a, *b, 1e-12);
    }
    assert!(diag.max_displacement < 1e-12);
    assert_eq!(diag.vertex_count, mesh.vertex_count());
    assert_eq!(diag.triangle_count, mesh.triangle_count());
}

#[test]
fn source_mesh_is_untouched() {
    let mesh = create_test_column(3);
    let before = mesh.clone();
    let curve = PolylineCurveEvaluator::new(&[
        TransformAnchor::at(Point3::new(5.0, 0.0, 0.0)),
        TransformAnchor::at(Point3::new(5.0, 8.0, 0.0)),
    ])
    .unwrap();

    let (morphed, _) = morph_mesh(&mesh, MorphSegment::default(), &curve).unwrap();
    assert_eq!(mesh, before);
    assert_ne!(morphed.positions, mesh.positions);
}

#[test]
fn frame_is_scaled_rotated_then_translated() {
    let rotation = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2).unwrap();
    let scale = Vec3::new(2.0, 3.0, 1.0);
    let offset = Vec3::new(10.0, 0.0, 0.0);
    let segment = MorphSegment::default();
    let curve = PolylineCurveEvaluator::new(&[
        TransformAnchor::new(segment.start + offset, rotation, scale),
        TransformAnchor::new(segment.end + offset, rotation, scale),
    ])
    .unwrap();

    let mesh = GeomMesh::new(vec![[1.0, 1.0, 0.0]], Vec::new());
    let (morphed, _) = morph_mesh(&mesh, segment, &curve).unwrap();

    // Offset (1, 1, 0) scales to (2, 3, 0), then turns a quarter about Z to (-3, 2, 0).
    assert_position(morphed.positions[0], [7.0, 2.0, 0.0], 1e-12);
}

#[test]
fn vertices_beyond_segment_use_curve_end_frame() {
    let mesh = GeomMesh::new(
        vec![[0.1, 0.2, 1.5], [0.1, 0.2, -2.0], [0.1, 0.2, 0.0]],
        Vec::new(),
    );
    let (morphed, diag) = morph_mesh(&mesh, MorphSegment::default(), &identity_line()).unwrap();

    // Base points follow the segment line, while the curve clamps to its ends.
    assert_position(morphed.positions[0], [0.1, 0.2, 0.5], 1e-12);
    assert_position(morphed.positions[1], [0.1, 0.2, -0.5], 1e-12);
    assert_position(morphed.positions[2], [0.1, 0.2, 0.0], 1e-12);
    assert_eq!(diag.extrapolated_vertex_count, 2);
    assert_relative_eq!(diag.max_displacement, 1.5, epsilon = 1e-12);
    assert_relative_eq!(diag.min_displacement, 0.0, epsilon = 1e-12);
}

#[test]
fn bend_along_bezier_arc() {
    let radius = 2.0;
    let handle = 0.552_284_749_8 * radius;
    let curve = BezierCurveEvaluator::new(
        Vec3::Y,
        &[
            BezierAnchor::at(Point3::ORIGIN).with_control_offset(Vec3::new(0.0, 0.0, handle)),
            BezierAnchor::at(Point3::new(radius, 0.0, radius))
                .with_control_offset(Vec3::new(handle, 0.0, 0.0)),
        ],
    )
    .unwrap();

    let mesh = create_test_column(8);
    let (morphed, diag) = morph_mesh(&mesh, MorphSegment::default(), &curve).unwrap();

    assert_eq!(morphed.vertex_count(), mesh.vertex_count());
    assert!(!morphed.has_invalid_vertices());
    assert!(diag.warnings.is_empty());

    // The far ring now lies around the curve end, facing +X.
    let far_ring = &morphed.positions[morphed.vertex_count() - 4..];
    for p in far_ring {
        assert_abs_diff_eq!(p[0], radius, epsilon = 1e-3);
    }

    let normals = morphed.normals.as_ref().unwrap();
    let tangents = morphed.tangents.as_ref().unwrap();
    assert_eq!(normals.len(), morphed.vertex_count());
    assert_eq!(tangents.len(), morphed.vertex_count());

    let bounds = diag.bounds.unwrap();
    assert_eq!(Some(bounds), morphed.bounds());
    // The outer side of the far ring ends up a half-width beyond the curve end.
    assert_abs_diff_eq!(bounds.max.z, radius + 0.25, epsilon = 1e-3);
}

#[test]
fn zero_length_segment_maps_everything_to_start() {
    let curve = PolylineCurveEvaluator::new(&[
        TransformAnchor::at(Point3::new(0.0, 0.0, 0.0)).with_scale(Vec3::new(2.0, 2.0, 2.0)),
        TransformAnchor::at(Point3::new(0.0, 0.0, 10.0)),
    ])
    .unwrap();
    let segment = MorphSegment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
    let mesh = GeomMesh::new(vec![[1.0, 0.0, 0.0], [2.0, 0.0, 5.0]], Vec::new());

    let (morphed, diag) = morph_mesh(&mesh, segment, &curve).unwrap();

    assert_position(morphed.positions[0], [0.0, 0.0, 0.0], 1e-12);
    assert_position(morphed.positions[1], [2.0, 0.0, 10.0], 1e-12);
    assert_eq!(diag.warnings.len(), 1);
    assert!(!morphed.has_invalid_vertices());
}

#[test]
fn empty_mesh_is_a_no_op() {
    let mesh = GeomMesh::default();
    let (morphed, diag) = morph_mesh(&mesh, MorphSegment::default(), &identity_line()).unwrap();

    assert_eq!(morphed, mesh);
    assert_eq!(diag.vertex_count, 0);
    assert!(diag.bounds.is_none());
    assert_eq!(diag.warnings.len(), 1);
}

#[test]
fn invalid_inputs_are_rejected() {
    let curve = identity_line();

    let nan_segment = MorphSegment::new(Point3::new(f64::NAN, 0.0, 0.0), Point3::ORIGIN);
    assert_eq!(
        morph_mesh(&create_test_column(1), nan_segment, &curve),
        Err(MorphError::InvalidSegment)
    );

    let mut nan_mesh = create_test_column(1);
    nan_mesh.positions[0][1] = f64::INFINITY;
    assert_eq!(
        morph_mesh(&nan_mesh, MorphSegment::default(), &curve),
        Err(MorphError::InvalidGeometry)
    );

    let mut broken = create_test_column(1);
    broken.indices.push(0);
    assert!(matches!(
        morph_mesh(&broken, MorphSegment::default(), &curve),
        Err(MorphError::InvalidMesh(_))
    ));
}

#[test]
fn options_can_keep_stale_attributes() {
    let mut mesh = create_test_column(2);
    mesh.recompute_derived();
    let curve = PolylineCurveEvaluator::new(&[
        TransformAnchor::at(Point3::new(0.0, 0.0, 0.0)),
        TransformAnchor::at(Point3::new(4.0, 0.0, 0.0)),
    ])
    .unwrap();

    let options = MorphOptions::new()
        .recompute_normals(false)
        .recompute_tangents(false);
    let (morphed, diag) =
        morph_mesh_with_options(&mesh, MorphSegment::default(), &curve, options).unwrap();

    assert_eq!(morphed.normals, mesh.normals);
    assert_eq!(morphed.tangents, mesh.tangents);
    assert_eq!(diag.warnings.len(), 2);
}

#[test]
fn works_through_trait_objects() {
    let curve: Box<dyn CurveEvaluator> = Box::new(identity_line());
    let mesh = create_test_column(1);
    let (morphed, _) = morph_mesh(&mesh, MorphSegment::default(), curve.as_ref()).unwrap();
    assert_eq!(morphed.vertex_count(), mesh.vertex_count());
}

#[test]
fn random_curves_preserve_vertex_count() {
    let mut rng = StdRng::seed_from_u64(99);
    let mesh = create_test_column(6);

    for _ in 0..10 {
        let anchors: Vec<BezierAnchor> = (0..rng.random_range(2..6))
            .map(|_| {
                BezierAnchor::at(Point3::new(
                    rng.random_range(-5.0..5.0),
                    rng.random_range(-5.0..5.0),
                    rng.random_range(-5.0..5.0),
                ))
                .with_control_offset(Vec3::new(
                    rng.random_range(-2.0..2.0),
                    rng.random_range(-2.0..2.0),
                    rng.random_range(-2.0..2.0),
                ))
            })
            .collect();
        let curve = BezierCurveEvaluator::new(Vec3::Y, &anchors).unwrap();

        let (morphed, diag) = morph_mesh(&mesh, MorphSegment::default(), &curve).unwrap();
        assert_eq!(morphed.vertex_count(), mesh.vertex_count());
        assert_eq!(morphed.indices, mesh.indices);
        assert!(!morphed.has_invalid_vertices());
        assert!(diag.min_displacement <= diag.avg_displacement);
        assert!(diag.avg_displacement <= diag.max_displacement);
    }
}

#[test]
fn scaled_anchor_rotation_keeps_offsets_rigid() {
    let scaled = Quat::new(0.0, 2.0, 0.0, 0.0);
    let curve = PolylineCurveEvaluator::new(&[
        TransformAnchor::at(Point3::ORIGIN).with_rotation(scaled),
        TransformAnchor::at(Point3::new(0.0, 0.0, 10.0)).with_rotation(scaled),
    ])
    .unwrap();
    let mesh = GeomMesh::new(vec![[1.0, 0.0, -0.5], [1.0, 0.0, 0.0], [1.0, 0.0, 0.5]], Vec::new());

    let (morphed, _) = morph_mesh(&mesh, MorphSegment::default(), &curve).unwrap();

    assert_position(morphed.positions[0], [-1.0, 0.0, 0.0], 1e-12);
    assert_position(morphed.positions[1], [-1.0, 0.0, 5.0], 1e-12);
    assert_position(morphed.positions[2], [-1.0, 0.0, 10.0], 1e-12);
}
