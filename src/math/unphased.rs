use ordered_float::OrderedFloat;

use crate::engine::count_table::{
    CountTable, KEY_AA_AR, KEY_AA_RA, KEY_AA_RR, KEY_AR_AA, KEY_AR_AR, KEY_AR_RA, KEY_AR_RR,
    KEY_ALT_ALT, KEY_ALT_REF, KEY_RA_AA, KEY_RA_AR, KEY_RA_RA, KEY_RA_RR, KEY_REF_ALT,
    KEY_REF_REF, KEY_RR_AA, KEY_RR_AR, KEY_RR_RA, KEY_RR_RR, KEY_AA_AA,
};
use crate::math::fisher::{chi_sqr, FisherMath};
use crate::math::phased::phased_math;
use crate::math::stats::{r_squared_range_flag, LdStats};

/// Tolerance for the biological feasibility window of the fitted
/// haplotype frequency.
pub const ALLOWED_ROUNDING_ERROR: f64 = 0.001;

/// Below this many observed alleles the likelihood surface is too flat for
/// the fit to mean anything.
pub const MINIMUM_ALLOWED_ALLELES: u64 = 5;

/// Relative tolerance classifying the cubic discriminant as zero; the
/// three-branch split is exquisitely sensitive right at the boundary.
const CUBIC_CLASS_TOLERANCE: f64 = 1e-12;

/// Real roots of the haplotype-frequency cubic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CubicRoots {
    /// Negative discriminant: three distinct real roots.
    Three(f64, f64, f64),
    /// Positive discriminant: a single real root.
    One(f64),
    /// Vanishing discriminant: a double root and a simple root.
    Repeated(f64, f64),
}

/**
 * Solves a·x³ + b·x² + c·x + d = 0 through the depressed-cubic inflection
 * form. The discriminant comparison uses a relative tolerance so that
 * near-degenerate tables fall into the repeated-root branch instead of
 * being whipsawed between the other two by rounding noise.
 */
pub fn solve_haplotype_cubic(a: f64, b: f64, c: f64, d: f64) -> CubicRoots {
    let x_n = -b / (3.0 * a);
    let d2 = (b * b - 3.0 * a * c) / (9.0 * a * a);
    let y_n = a * x_n.powi(3) + b * x_n.powi(2) + c * x_n + d;
    let y_n2 = y_n * y_n;
    let h2 = 4.0 * a * a * d2.powi(3);

    let diff = y_n2 - h2;
    let tolerance = CUBIC_CLASS_TOLERANCE * y_n2.abs();

    if diff < -tolerance {
        let theta = (-y_n / h2.sqrt()).acos() / 3.0;
        let constant = 2.0 * d2.sqrt();
        let alpha = x_n + constant * theta.cos();
        let beta = x_n + constant * (2.0 * std::f64::consts::PI / 3.0 + theta).cos();
        let gamma = x_n + constant * (4.0 * std::f64::consts::PI / 3.0 + theta).cos();
        CubicRoots::Three(alpha, beta, gamma)
    } else if diff > tolerance {
        let constant = diff.sqrt();
        let left = ((-y_n + constant) / (2.0 * a)).cbrt();
        let right = ((-y_n - constant) / (2.0 * a)).cbrt();
        CubicRoots::One(x_n + left + right)
    } else {
        let delta = (y_n / (2.0 * a)).cbrt();
        CubicRoots::Repeated(x_n + delta, x_n - 2.0 * delta)
    }
}

/**
 * LD statistics from a filled 3×3 unphased table.
 *
 * Without double heterozygotes there is no phase uncertainty and the table
 * collapses losslessly to haplotype-scale 2×2 counts. Otherwise the
 * maximum-likelihood REF/REF haplotype frequency is the biologically
 * admissible root of the EM closed-form cubic that best fits the observed
 * table by chi-squared; pairs with no admissible root are reported as
 * uninformative.
 */
pub(crate) fn unphased_math(table: &mut CountTable, fisher: &FisherMath) -> Option<LdStats> {
    let cells = &table.cells;
    let total: u64 = cells[KEY_RR_RR]
        + cells[KEY_RR_RA]
        + cells[KEY_RR_AR]
        + cells[KEY_RR_AA]
        + cells[KEY_RA_RR]
        + cells[KEY_RA_RA]
        + cells[KEY_RA_AR]
        + cells[KEY_RA_AA]
        + cells[KEY_AR_RR]
        + cells[KEY_AR_RA]
        + cells[KEY_AR_AR]
        + cells[KEY_AR_AA]
        + cells[KEY_AA_RR]
        + cells[KEY_AA_RA]
        + cells[KEY_AA_AR]
        + cells[KEY_AA_AA];
    table.total_haplotypes = total;

    if total < MINIMUM_ALLOWED_ALLELES {
        return None;
    }

    let hets =
        cells[KEY_RA_RA] + cells[KEY_RA_AR] + cells[KEY_AR_RA] + cells[KEY_AR_AR];

    if hets == 0 {
        // No phase uncertainty: fold the 3×3 into haplotype counts and use
        // the exact phased path.
        let p0 = 2 * cells[KEY_RR_RR]
            + cells[KEY_RR_RA]
            + cells[KEY_RR_AR]
            + cells[KEY_RA_RR]
            + cells[KEY_AR_RR];
        let q0 = cells[KEY_RA_RR]
            + cells[KEY_AR_RR]
            + 2 * cells[KEY_AA_RR]
            + cells[KEY_AA_RA]
            + cells[KEY_AA_AR];
        let p1 = cells[KEY_RR_RA]
            + cells[KEY_RR_AR]
            + 2 * cells[KEY_RR_AA]
            + cells[KEY_RA_AA]
            + cells[KEY_AR_AA];
        let q1 = cells[KEY_RA_AA]
            + cells[KEY_AR_AA]
            + cells[KEY_AA_RA]
            + cells[KEY_AA_AR]
            + 2 * cells[KEY_AA_AA];

        table.cells[KEY_REF_REF] = p0;
        table.cells[KEY_REF_ALT] = p1;
        table.cells[KEY_ALT_REF] = q0;
        table.cells[KEY_ALT_ALT] = q1;
        return phased_math(table, fisher);
    }

    let t = total as f64;
    let p = ((cells[KEY_RR_RR] + cells[KEY_RR_RA] + cells[KEY_RR_AR] + cells[KEY_RR_AA]) as f64
        * 2.0
        + (cells[KEY_RA_RR]
            + cells[KEY_RA_RA]
            + cells[KEY_RA_AR]
            + cells[KEY_RA_AA]
            + cells[KEY_AR_RR]
            + cells[KEY_AR_RA]
            + cells[KEY_AR_AR]
            + cells[KEY_AR_AA]) as f64)
        / (2.0 * t);
    let q = ((cells[KEY_RR_RR] + cells[KEY_RA_RR] + cells[KEY_AR_RR] + cells[KEY_AA_RR]) as f64
        * 2.0
        + (cells[KEY_RR_RA]
            + cells[KEY_RR_AR]
            + cells[KEY_RA_RA]
            + cells[KEY_RA_AR]
            + cells[KEY_AR_RA]
            + cells[KEY_AR_AR]
            + cells[KEY_AA_RA]
            + cells[KEY_AA_AR]) as f64)
        / (2.0 * t);
    let n11 = (2 * cells[KEY_RR_RR]
        + cells[KEY_RR_RA]
        + cells[KEY_RR_AR]
        + cells[KEY_RA_RR]
        + cells[KEY_AR_RR]) as f64;
    let n_hets = hets as f64;

    // EM closed-form cubic in the REF/REF haplotype frequency.
    let big_g = 1.0 - 2.0 * p - 2.0 * q;
    let a = 4.0 * t;
    let b = 2.0 * t * big_g - 2.0 * n11 - n_hets;
    let c = -n11 * big_g - n_hets * (1.0 - p - q) + 2.0 * t * p * q;
    let d = -n11 * p * q;

    let minhap = n11 / (2.0 * t);
    let maxhap = (n11 + n_hets) / (2.0 * t);
    let admissible = |root: f64| {
        root >= minhap - ALLOWED_ROUNDING_ERROR && root <= maxhap + ALLOWED_ROUNDING_ERROR
    };

    let candidates = match solve_haplotype_cubic(a, b, c, d) {
        CubicRoots::Three(alpha, beta, gamma) => vec![alpha, beta, gamma],
        CubicRoots::One(alpha) => vec![alpha],
        CubicRoots::Repeated(alpha, gamma) => {
            if alpha.is_nan() || gamma.is_nan() {
                return None;
            }
            vec![alpha, gamma]
        }
    };

    // Among biologically admissible roots, keep the best goodness-of-fit.
    let (target, chi_sq_model) = candidates
        .into_iter()
        .filter(|&root| admissible(root))
        .map(|root| (root, chi_squared_fit(table, t, root, p, q)))
        .min_by_key(|&(_, chi)| OrderedFloat(chi))?;

    let f11 = target;
    let f12 = p - f11;
    let f21 = q - f11;
    let f22 = (1.0 - (f11 + f12 + f21)).max(0.0);

    let d_stat = f11 * f22 - f12 * f21;
    let r_squared = d_stat * d_stat / (p * (1.0 - p) * q * (1.0 - q));
    let r = r_squared.sqrt();

    let d_max = if d_stat >= 0.0 {
        (p * (1.0 - q)).min(q * (1.0 - p))
    } else {
        -(p * q).min((1.0 - p) * (1.0 - q))
    };
    let d_prime = d_stat / d_max;

    let flags = r_squared_range_flag(r_squared);
    // 2×2 significance via the chi-squared survival of the LD statistic
    // over 2T haplotypes with one degree of freedom.
    let p_value = chi_sqr(1, 2.0 * t * r_squared);

    Some(LdStats {
        d: d_stat,
        d_max,
        d_prime,
        r,
        r_squared,
        p: p_value,
        chi_sq_model,
        total_haplotypes: total,
        flags,
    })
}

/// Chi-squared goodness of fit of a candidate REF/REF haplotype frequency
/// against the observed 3×3 table, with expected cells from the implied
/// haplotype frequencies under random mating.
fn chi_squared_fit(table: &CountTable, t: f64, target: f64, p: f64, q: f64) -> f64 {
    let cells = &table.cells;
    let f12 = p - target;
    let f21 = q - target;
    let f22 = 1.0 - (target + f12 + f21);

    let e1111 = t * target * target;
    let e1112 = 2.0 * t * target * f12;
    let e1122 = t * f12 * f12;
    let e1211 = 2.0 * t * target * f21;
    let e1212 = 2.0 * t * f12 * f21 + 2.0 * t * target * f22;
    let e1222 = 2.0 * t * f12 * f22;
    let e2211 = t * f21 * f21;
    let e2212 = 2.0 * t * f21 * f22;
    let e2222 = t * f22 * f22;

    let term = |expected: f64, observed: f64| {
        if expected > 0.0 {
            (observed - expected).powi(2) / expected
        } else {
            0.0
        }
    };

    term(e1111, cells[KEY_RR_RR] as f64)
        + term(e1112, (cells[KEY_RR_RA] + cells[KEY_RR_AR]) as f64)
        + term(e1122, cells[KEY_RR_AA] as f64)
        + term(e1211, (cells[KEY_RA_RR] + cells[KEY_AR_RR]) as f64)
        + term(
            e1212,
            (cells[KEY_RA_RA] + cells[KEY_RA_AR] + cells[KEY_AR_RA] + cells[KEY_AR_AR]) as f64,
        )
        + term(e1222, (cells[KEY_RA_AA] + cells[KEY_AR_AA]) as f64)
        + term(e2211, cells[KEY_AA_RR] as f64)
        + term(e2212, (cells[KEY_AA_RA] + cells[KEY_AA_AR]) as f64)
        + term(e2222, cells[KEY_AA_AA] as f64)
}
