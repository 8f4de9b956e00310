//! Unphased popcount kernels. The joint masks of the phased kernels are
//! folded through the pair filters so each count is per sample (one 3×3
//! genotype cell) instead of per haplotype. Skipped all-REF lanes
//! contribute whole samples to the REF/REF-REF/REF cell.

use crate::engine::params::LdParams;
use crate::genotype::bit_vector::GenotypeVector;
use crate::kernels::lanes::{
    alt_alt, alt_first, alt_second, byte_het_filter, byte_het_filter_pair, byte_hom_filter,
    het_filter, het_filter_pair, hom_filter, mask_merge, ref_ref, LaneOps,
};
use crate::kernels::SimdWidth;

/// Sample-level 3×3 genotype cell counts for one site pair; field order is
/// (site1 genotype)_(site2 genotype) with rr/ra/aa rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct UnphasedBlockCounts {
    pub rr_rr: u64,
    pub rr_ra: u64,
    pub rr_aa: u64,
    pub ra_rr: u64,
    pub ra_ra: u64,
    pub ra_aa: u64,
    pub aa_rr: u64,
    pub aa_ra: u64,
    pub aa_aa: u64,
}

fn smallest_spans(va: &GenotypeVector, vb: &GenotypeVector) -> (usize, usize, usize, usize) {
    (
        va.front_zero.min(vb.front_zero) as usize,
        va.front_zero.max(vb.front_zero) as usize,
        va.tail_zero.min(vb.tail_zero) as usize,
        va.tail_zero.max(vb.tail_zero) as usize,
    )
}

/// Full 3×3 kernel honouring per-haplotype missingness; samples with any
/// missing haplotype at either site fall out of every cell.
pub(crate) fn unphased_masked(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    match params.width {
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx512 => unsafe { unphased_masked_avx512(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx2 => unsafe { unphased_masked_avx2(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Sse2 => unsafe { unphased_masked_sse2(params, va, vb) },
        _ => unsafe { unphased_masked_inner::<crate::kernels::lanes::ScalarLane>(params, va, vb) },
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f")]
unsafe fn unphased_masked_avx512(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    unphased_masked_inner::<crate::kernels::x86::Avx512Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn unphased_masked_avx2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    unphased_masked_inner::<crate::kernels::x86::Avx2Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn unphased_masked_sse2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    unphased_masked_inner::<crate::kernels::x86::Sse2Lane>(params, va, vb)
}

#[inline(always)]
unsafe fn unphased_masked_inner<V: LaneOps>(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    debug_assert_eq!(V::BYTES, params.width.bytes());
    let (a, am) = (va.data(), va.mask());
    let (b, bm) = (vb.data(), vb.mask());
    let (front_smallest, front_bonus, tail_smallest, tail_bonus) = smallest_spans(va, vb);
    let w = V::BYTES;

    let mut c = UnphasedBlockCounts::default();
    let mut i = front_smallest;
    while i < params.vector_cycles - tail_smallest {
        let long = i >= front_bonus && i < params.vector_cycles - tail_bonus;
        let m = mask_merge(V::load(am.as_ptr().add(i * w)), V::load(bm.as_ptr().add(i * w)));
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        let refref = V::and(ref_ref(x, y), m);
        let altf = V::and(alt_first(x, y), m);
        let alts = V::and(alt_second(x, y), m);
        let altalt = V::and(alt_alt(x, y), m);

        c.rr_rr += V::popcount(hom_filter(refref));
        c.rr_ra += V::popcount(het_filter_pair(refref, alts, alts, refref));
        c.rr_aa += V::popcount(het_filter(alts, alts));
        c.ra_rr += V::popcount(het_filter_pair(refref, altf, altf, refref));
        c.ra_ra += V::popcount(het_filter_pair(refref, altalt, altalt, refref));
        c.ra_ra += V::popcount(het_filter_pair(altf, alts, alts, altf));
        c.aa_rr += V::popcount(het_filter(altf, altf));
        if long {
            c.ra_aa += V::popcount(het_filter_pair(alts, altalt, altalt, alts));
            c.aa_ra += V::popcount(het_filter_pair(altf, altalt, altalt, altf));
            c.aa_aa += V::popcount(hom_filter(altalt));
        }
        i += 1;
    }

    let mut k = params.byte_aligned_end;
    while k < params.byte_width {
        let m = !(am[k] | bm[k]);
        let refref = (!a[k] & !b[k]) & m;
        let altf = ((a[k] ^ b[k]) & a[k]) & m;
        let alts = ((a[k] ^ b[k]) & b[k]) & m;
        let altalt = (a[k] & b[k]) & m;

        c.rr_rr += byte_hom_filter(refref).count_ones() as u64;
        c.rr_ra += byte_het_filter_pair(refref, alts, alts, refref).count_ones() as u64;
        c.rr_aa += byte_het_filter(alts, alts).count_ones() as u64;
        c.ra_rr += byte_het_filter_pair(refref, altf, altf, refref).count_ones() as u64;
        c.ra_ra += byte_het_filter_pair(refref, altalt, altalt, refref).count_ones() as u64;
        c.ra_ra += byte_het_filter_pair(altf, alts, alts, altf).count_ones() as u64;
        c.ra_aa += byte_het_filter_pair(alts, altalt, altalt, alts).count_ones() as u64;
        c.aa_rr += byte_het_filter(altf, altf).count_ones() as u64;
        c.aa_ra += byte_het_filter_pair(altf, altalt, altalt, altf).count_ones() as u64;
        c.aa_aa += byte_hom_filter(altalt).count_ones() as u64;
        k += 1;
    }

    c.rr_rr += ((front_smallest + tail_smallest) * params.trip_count) as u64;
    c.rr_rr -= params.unphased_unbalanced_adjustment;
    c
}

/**
 * 3×3 kernel for sites without missing haplotypes. The double-heterozygote
 * cell is not measured; the caller recovers it by subtracting the other
 * eight cells from the sample count.
 */
pub(crate) fn unphased_no_missing(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    match params.width {
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx512 => unsafe { unphased_no_missing_avx512(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx2 => unsafe { unphased_no_missing_avx2(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Sse2 => unsafe { unphased_no_missing_sse2(params, va, vb) },
        _ => unsafe {
            unphased_no_missing_inner::<crate::kernels::lanes::ScalarLane>(params, va, vb)
        },
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f")]
unsafe fn unphased_no_missing_avx512(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    unphased_no_missing_inner::<crate::kernels::x86::Avx512Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn unphased_no_missing_avx2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    unphased_no_missing_inner::<crate::kernels::x86::Avx2Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn unphased_no_missing_sse2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    unphased_no_missing_inner::<crate::kernels::x86::Sse2Lane>(params, va, vb)
}

#[inline(always)]
unsafe fn unphased_no_missing_inner<V: LaneOps>(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> UnphasedBlockCounts {
    debug_assert_eq!(V::BYTES, params.width.bytes());
    let a = va.data();
    let b = vb.data();
    let (front_smallest, front_bonus, tail_smallest, tail_bonus) = smallest_spans(va, vb);
    let w = V::BYTES;

    let mut c = UnphasedBlockCounts::default();
    let mut i = front_smallest;
    while i < params.vector_cycles - tail_smallest {
        let long = i >= front_bonus && i < params.vector_cycles - tail_bonus;
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        let refref = ref_ref(x, y);
        let altf = alt_first(x, y);
        let alts = alt_second(x, y);
        let altalt = alt_alt(x, y);

        c.rr_rr += V::popcount(hom_filter(refref));
        c.rr_ra += V::popcount(het_filter_pair(refref, alts, alts, refref));
        c.rr_aa += V::popcount(het_filter(alts, alts));
        c.ra_rr += V::popcount(het_filter_pair(refref, altf, altf, refref));
        c.aa_rr += V::popcount(het_filter(altf, altf));
        if long {
            c.ra_aa += V::popcount(het_filter_pair(alts, altalt, altalt, alts));
            c.aa_ra += V::popcount(het_filter_pair(altf, altalt, altalt, altf));
            c.aa_aa += V::popcount(hom_filter(altalt));
        }
        i += 1;
    }

    let mut k = params.byte_aligned_end;
    while k < params.byte_width {
        let refref = !a[k] & !b[k];
        let altf = (a[k] ^ b[k]) & a[k];
        let alts = (a[k] ^ b[k]) & b[k];
        let altalt = a[k] & b[k];

        c.rr_rr += byte_hom_filter(refref).count_ones() as u64;
        c.rr_ra += byte_het_filter_pair(refref, alts, alts, refref).count_ones() as u64;
        c.rr_aa += byte_het_filter(alts, alts).count_ones() as u64;
        c.ra_rr += byte_het_filter_pair(refref, altf, altf, refref).count_ones() as u64;
        c.ra_aa += byte_het_filter_pair(alts, altalt, altalt, alts).count_ones() as u64;
        c.aa_rr += byte_het_filter(altf, altf).count_ones() as u64;
        c.aa_ra += byte_het_filter_pair(altf, altalt, altalt, altf).count_ones() as u64;
        c.aa_aa += byte_hom_filter(altalt).count_ones() as u64;
        k += 1;
    }

    c.rr_rr += ((front_smallest + tail_smallest) * params.trip_count) as u64;
    c.rr_rr -= params.unphased_unbalanced_adjustment;
    c
}
