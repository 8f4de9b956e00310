#![allow(non_upper_case_globals)]

extern crate currawong;
#[macro_use]
extern crate approx;

use currawong::math::unphased::{solve_haplotype_cubic, CubicRoots};

/// Coefficients of a·(x - r1)(x - r2)(x - r3).
fn expand(a: f64, r1: f64, r2: f64, r3: f64) -> (f64, f64, f64, f64) {
    (
        a,
        -a * (r1 + r2 + r3),
        a * (r1 * r2 + r1 * r3 + r2 * r3),
        -a * r1 * r2 * r3,
    )
}

#[test]
fn three_distinct_roots_are_recovered() {
    let (a, b, c, d) = expand(4000.0, 0.1, 0.2, 0.4);
    match solve_haplotype_cubic(a, b, c, d) {
        CubicRoots::Three(alpha, beta, gamma) => {
            let mut roots = [alpha, beta, gamma];
            roots.sort_by(|x, y| x.partial_cmp(y).unwrap());
            assert_relative_eq!(roots[0], 0.1, epsilon = 1e-9);
            assert_relative_eq!(roots[1], 0.2, epsilon = 1e-9);
            assert_relative_eq!(roots[2], 0.4, epsilon = 1e-9);
        }
        other => panic!("Expected three real roots, got {:?}", other),
    }
}

#[test]
fn three_real_roots_sum_to_three_times_the_inflection() {
    for (r1, r2, r3) in [
        (0.05, 0.2, 0.31),
        (-0.4, 0.1, 0.9),
        (0.11, 0.48, 0.73),
        (-2.0, 1.0, 5.5),
    ] {
        let (a, b, c, d) = expand(640.0, r1, r2, r3);
        let x_n = -b / (3.0 * a);
        match solve_haplotype_cubic(a, b, c, d) {
            CubicRoots::Three(alpha, beta, gamma) => {
                assert_relative_eq!(alpha + beta + gamma, 3.0 * x_n, epsilon = 1e-9);
                assert_relative_eq!(alpha + beta + gamma, r1 + r2 + r3, epsilon = 1e-9);
            }
            other => panic!(
                "Roots ({}, {}, {}) should be distinct and real, got {:?}",
                r1, r2, r3, other
            ),
        }
    }
}

#[test]
fn single_real_root_branch() {
    // (x - 0.3)(x^2 + x + 1): the quadratic factor has no real zero.
    let a = 4000.0;
    let (b, c, d) = (a * 0.7, a * 0.7, -a * 0.3);
    match solve_haplotype_cubic(a, b, c, d) {
        CubicRoots::One(alpha) => assert_relative_eq!(alpha, 0.3, epsilon = 1e-9),
        other => panic!("Expected a single real root, got {:?}", other),
    }
}

#[test]
fn repeated_root_branch() {
    // (x - 2)^2 (x - 5).
    let (a, b, c, d) = (1.0, -9.0, 24.0, -20.0);
    match solve_haplotype_cubic(a, b, c, d) {
        CubicRoots::Repeated(double, single) => {
            assert_relative_eq!(double, 2.0, epsilon = 1e-7);
            assert_relative_eq!(single, 5.0, epsilon = 1e-7);
        }
        other => panic!("Expected a repeated root, got {:?}", other),
    }
}

#[test]
fn repeated_roots_never_produce_nan_for_finite_input() {
    let (a, b, c, d) = (1.0, -9.0, 24.0, -20.0);
    if let CubicRoots::Repeated(double, single) = solve_haplotype_cubic(a, b, c, d) {
        assert!(double.is_finite());
        assert!(single.is_finite());
    }
}
