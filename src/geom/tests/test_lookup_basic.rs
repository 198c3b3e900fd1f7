//! Randomized checks for lookup table bracketing.

use crate::geom::{Bracket, LookupTable};
use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Table with random non-negative increments, some of them zero.
fn random_table(rng: &mut StdRng, len: usize) -> LookupTable<usize> {
    let mut table = LookupTable::with_capacity(len);
    let mut value = 0.0;
    for i in 0..len {
        if i > 0 && rng.random_bool(0.8) {
            value += rng.random_range(0.0..5.0);
        }
        table.push(value, i);
    }
    table
}

fn value_at(table: &LookupTable<usize>, b: Bracket) -> f64 {
    let lower = table.nodes()[b.lower].value();
    let upper = table.nodes()[b.upper].value();
    lower + (upper - lower) * b.fraction
}

#[test]
fn bracket_reconstructs_target() {
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..50 {
        let len = rng.random_range(2..12);
        let table = random_table(&mut rng, len);
        let total = table.total();

        for _ in 0..20 {
            let target = rng.random_range(0.0..=total);
            let b = table.bracket(target);

            assert_eq!(b.upper, b.lower + 1);
            assert!(b.upper < table.len());
            assert!((0.0..=1.0).contains(&b.fraction));
            assert_abs_diff_eq!(value_at(&table, b), target, epsilon = 1e-9);
        }
    }
}

#[test]
fn upper_index_is_first_strictly_greater() {
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..50 {
        let len = rng.random_range(2..12);
        let table = random_table(&mut rng, len);
        let target = rng.random_range(0.0..=table.total());
        let upper = table.upper_index(target);

        // Same answer as a linear scan, clamped into the valid bracket range.
        let linear = table
            .nodes()
            .iter()
            .position(|n| n.value() > target)
            .unwrap_or(table.len() - 1)
            .clamp(1, table.len() - 1);
        assert_eq!(upper, linear);
    }
}

#[test]
fn bracket_extremes() {
    let mut table = LookupTable::with_capacity(3);
    table.push(0.0, 'a');
    table.push(2.0, 'b');
    table.push(5.0, 'c');

    assert_eq!(table.first().map(|n| *n.content()), Some('a'));
    assert_eq!(table.last().map(|n| *n.content()), Some('c'));

    let below = table.bracket(-3.0);
    assert_eq!((below.lower, below.upper, below.fraction), (0, 1, 0.0));

    let above = table.bracket(50.0);
    assert_eq!((above.lower, above.upper, above.fraction), (1, 2, 1.0));
}
