use crate::geom::{
    CurveEvaluator, Point3, PolylineCurveEvaluator, TransformAnchor, distribute_along_curve,
    placement_parameters,
};

fn line() -> PolylineCurveEvaluator {
    PolylineCurveEvaluator::new(&[
        TransformAnchor::at(Point3::new(0.0, 0.0, 0.0)),
        TransformAnchor::at(Point3::new(10.0, 0.0, 0.0)),
    ])
    .unwrap()
}

#[test]
fn parameters_cover_both_ends() {
    assert_eq!(placement_parameters(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(placement_parameters(2), vec![0.0, 1.0]);
}

#[test]
fn single_or_zero_count_places_at_start() {
    assert_eq!(placement_parameters(1), vec![0.0]);
    assert_eq!(placement_parameters(0), vec![0.0]);
}

#[test]
fn distribute_along_polyline() {
    let curve = line();
    let placed = distribute_along_curve(&curve, 3);

    let xs: Vec<f64> = placed.iter().map(|a| a.position.x).collect();
    assert_eq!(xs, vec![0.0, 5.0, 10.0]);
    assert_eq!(placed[2], curve.evaluate(1.0));
}
