use crate::engine::count_table::{CountTable, KEY_ALT_ALT, KEY_ALT_REF, KEY_REF_ALT, KEY_REF_REF};
use crate::math::fisher::FisherMath;
use crate::math::stats::{r_squared_range_flag, LdStats, R2_RANGE_TOLERANCE};

/**
 * LD statistics from a filled 2×2 haplotype table. The four cell
 * frequencies play the haplotype-frequency roles directly; a pair whose
 * coupling/repulsion products cancel exactly is uninformative and yields
 * no result.
 */
pub(crate) fn phased_math(table: &mut CountTable, fisher: &FisherMath) -> Option<LdStats> {
    let n00 = table.cells[KEY_REF_REF];
    let n01 = table.cells[KEY_REF_ALT];
    let n10 = table.cells[KEY_ALT_REF];
    let n11 = table.cells[KEY_ALT_ALT];

    let total = n00 + n01 + n10 + n11;
    table.total_haplotypes = total;
    if total == 0 {
        return None;
    }

    let t = total as f64;
    let p_a = n00 as f64 / t;
    let q_a = n01 as f64 / t;
    let p_b = n10 as f64 / t;
    let q_b = n11 as f64 / t;

    if p_a * q_b - q_a * p_b == 0.0 {
        return None;
    }

    // Allelic marginals; all four are nonzero once D is.
    let g0 = (n00 + n01) as f64 / t;
    let g1 = (n10 + n11) as f64 / t;
    let h0 = (n00 + n10) as f64 / t;
    let h1 = (n01 + n11) as f64 / t;

    let d = p_a * q_b - q_a * p_b;
    let r_squared = d * d / (g0 * g1 * h0 * h1);
    let r = r_squared.sqrt();

    let d_max = if d >= 0.0 {
        (g0 * h1).min(h0 * g1)
    } else {
        -(g0 * g1).min(h0 * h1)
    };
    let d_prime = d / d_max;

    debug_assert!(r_squared >= 0.0 && r_squared <= 1.0 + R2_RANGE_TOLERANCE);
    let flags = r_squared_range_flag(r_squared);
    let p = fisher.fisher_two_sided(n00, n01, n10, n11);

    Some(LdStats {
        d,
        d_max,
        d_prime,
        r,
        r_squared,
        p,
        chi_sq_model: 0.0,
        total_haplotypes: total,
        flags,
    })
}
